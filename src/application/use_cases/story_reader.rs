use crate::domain::error::{AppError, Result};
use crate::domain::story::{CompleteStory, CompleteStoryNode};
use crate::infrastructure::db::StoryStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Assembles a persisted story into the complete tree the client consumes:
/// the root node plus a map of every node keyed by id.
pub struct StoryReaderUseCase {
    stories: Arc<dyn StoryStore + Send + Sync>,
}

impl StoryReaderUseCase {
    pub fn new(stories: Arc<dyn StoryStore + Send + Sync>) -> Self {
        Self { stories }
    }

    pub async fn execute(&self, story_id: i64) -> Result<CompleteStory> {
        let story = self.stories.get_story(story_id).await?;
        let nodes = self.stories.list_nodes(story_id).await?;

        let mut root = None;
        let mut all_nodes = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let is_root = node.is_root;
            let detail: CompleteStoryNode = node.into();
            if is_root {
                root = Some(detail.clone());
            }
            all_nodes.insert(detail.id, detail);
        }

        let root_node = root.ok_or_else(|| {
            AppError::NotFound(format!("Story {} has no root node", story_id))
        })?;

        Ok(CompleteStory {
            id: story.id,
            title: story.title,
            session_id: story.session_id,
            created_at: story.created_at,
            main_image: story.main_image,
            root_node,
            all_nodes,
        })
    }
}
