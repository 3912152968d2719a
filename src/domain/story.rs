use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persisted story. `main_image` holds a base64-encoded cover image when
/// image generation succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub main_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    pub id: i64,
    pub story_id: i64,
    pub content: String,
    pub is_root: bool,
    pub is_ending: bool,
    pub is_winning_ending: bool,
    pub options: Vec<StoryOption>,
    pub image: Option<String>,
}

/// A choice on a node, pointing at the persisted child node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryOption {
    pub text: String,
    pub node_id: i64,
}

/// The fully-assembled story returned by the complete-story endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStory {
    pub id: i64,
    pub title: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub main_image: Option<String>,
    pub root_node: CompleteStoryNode,
    pub all_nodes: HashMap<i64, CompleteStoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStoryNode {
    pub id: i64,
    pub content: String,
    pub is_ending: bool,
    pub is_winning_ending: bool,
    pub options: Vec<StoryOption>,
    pub image: Option<String>,
}

impl From<StoryNode> for CompleteStoryNode {
    fn from(node: StoryNode) -> Self {
        Self {
            id: node.id,
            content: node.content,
            is_ending: node.is_ending,
            is_winning_ending: node.is_winning_ending,
            options: node.options,
            image: node.image,
        }
    }
}
