pub mod gemini;

use crate::domain::error::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

#[async_trait]
pub trait LLMClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}
