use serde::{Deserialize, Serialize};

/// Story tree as emitted by the LLM. Field names follow the camelCase JSON
/// schema the generation prompt asks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryTree {
    pub title: String,
    #[serde(rename = "rootNode")]
    pub root_node: StoryNodeTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNodeTree {
    pub content: String,
    #[serde(rename = "isEnding", default)]
    pub is_ending: bool,
    #[serde(rename = "isWinningEnding", default)]
    pub is_winning_ending: bool,
    #[serde(default)]
    pub options: Vec<StoryOptionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryOptionTree {
    pub text: String,
    #[serde(rename = "nextNode")]
    pub next_node: StoryNodeTree,
}
