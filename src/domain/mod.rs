pub mod error;
pub mod job;
pub mod llm;
pub mod settings;
pub mod story;
