pub mod connection;
pub mod jobs;
pub mod stories;

use crate::domain::error::Result;
use crate::domain::job::StoryJob;
use crate::domain::story::{Story, StoryNode, StoryOption};
use async_trait::async_trait;

pub use jobs::JobRepository;
pub use stories::StoryRepository;

/// Persistence seam for stories and their nodes.
#[async_trait]
pub trait StoryStore {
    async fn insert_story(&self, title: &str, session_id: &str) -> Result<i64>;
    async fn set_main_image(&self, story_id: i64, image: &str) -> Result<()>;
    async fn get_story(&self, story_id: i64) -> Result<Story>;
    async fn insert_node(
        &self,
        story_id: i64,
        content: &str,
        is_root: bool,
        is_ending: bool,
        is_winning_ending: bool,
    ) -> Result<i64>;
    async fn set_node_image(&self, node_id: i64, image: &str) -> Result<()>;
    async fn set_node_options(&self, node_id: i64, options: &[StoryOption]) -> Result<()>;
    async fn list_nodes(&self, story_id: i64) -> Result<Vec<StoryNode>>;
}

/// Persistence seam for story-generation jobs.
#[async_trait]
pub trait JobStore {
    async fn create(&self, job_id: &str, session_id: &str, theme: &str) -> Result<StoryJob>;
    async fn get(&self, job_id: &str) -> Result<StoryJob>;
    async fn mark_processing(&self, job_id: &str) -> Result<()>;
    async fn mark_completed(&self, job_id: &str, story_id: i64) -> Result<()>;
    async fn mark_failed(&self, job_id: &str, error: &str) -> Result<()>;
}
