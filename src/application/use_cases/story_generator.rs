use crate::domain::error::{AppError, Result};
use crate::domain::llm::{StoryNodeTree, StoryTree};
use crate::domain::story::StoryOption;
use crate::infrastructure::db::StoryStore;
use crate::infrastructure::image_clients::FreepikClient;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::extract_json_payload;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are a creative story writer that creates engaging \
choose-your-own-adventure stories. Generate a complete branching story with multiple \
paths and endings in the JSON format I'll specify.";

/// Generates a complete branching story for a theme and persists it.
///
/// The LLM produces the whole tree in one call; persistence walks it
/// depth-first so each node's options can reference the row ids of its
/// children. Image generation is best-effort: failures are logged and the
/// story is kept without the image.
pub struct StoryGeneratorUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    image_client: Option<Arc<FreepikClient>>,
    stories: Arc<dyn StoryStore + Send + Sync>,
}

impl StoryGeneratorUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        image_client: Option<Arc<FreepikClient>>,
        stories: Arc<dyn StoryStore + Send + Sync>,
    ) -> Self {
        Self {
            llm_client,
            image_client,
            stories,
        }
    }

    /// Generates and persists a story, returning the new story id.
    pub async fn execute(&self, session_id: &str, theme: &str) -> Result<i64> {
        let user_prompt = build_story_prompt(theme);

        let raw = self.llm_client.generate(SYSTEM_PROMPT, &user_prompt).await?;
        let payload = extract_json_payload(&raw);

        let tree: StoryTree = serde_json::from_str(&payload).map_err(|e| {
            AppError::ParseError(format!("Failed to parse story JSON from LLM: {e}"))
        })?;

        let story_id = self.stories.insert_story(&tree.title, session_id).await?;
        info!(story_id, title = %tree.title, "Persisting generated story");

        if let Some(images) = &self.image_client {
            match images
                .generate_story_image(&tree.title, &tree.root_node.content, theme)
                .await
            {
                Ok(image) => self.stories.set_main_image(story_id, &image).await?,
                Err(e) => warn!(story_id, error = %e, "Failed to generate story cover image"),
            }
        }

        self.persist_node(story_id, &tree.root_node, true, theme)
            .await?;

        Ok(story_id)
    }

    // Boxed future: the tree is recursive and async fns cannot recurse
    // without indirection.
    fn persist_node<'a>(
        &'a self,
        story_id: i64,
        node: &'a StoryNodeTree,
        is_root: bool,
        theme: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<i64>> + Send + 'a>> {
        Box::pin(async move {
            let node_id = self
                .stories
                .insert_node(
                    story_id,
                    &node.content,
                    is_root,
                    node.is_ending,
                    node.is_winning_ending,
                )
                .await?;

            if let Some(images) = &self.image_client {
                match images.generate_node_image(&node.content, theme).await {
                    Ok(image) => self.stories.set_node_image(node_id, &image).await?,
                    Err(e) => warn!(node_id, error = %e, "Failed to generate node image"),
                }
            }

            if !node.is_ending && !node.options.is_empty() {
                let mut options = Vec::with_capacity(node.options.len());
                for option in &node.options {
                    let child_id = self
                        .persist_node(story_id, &option.next_node, false, theme)
                        .await?;
                    options.push(StoryOption {
                        text: option.text.clone(),
                        node_id: child_id,
                    });
                }
                self.stories.set_node_options(node_id, &options).await?;
            }

            Ok(node_id)
        })
    }
}

fn build_story_prompt(theme: &str) -> String {
    format!(
        r#"The story should have:
1. A compelling title
2. A starting situation (root node) with 2-3 options
3. Each option should lead to another node with its own options
4. Some paths should lead to endings (both winning and losing)
5. At least one path should lead to a winning ending

Story structure requirements:
- Each node should have 2-3 options except for ending nodes
- The story should be 3-4 levels deep (including root node)
- Add variety in the path lengths (some end earlier, some later)
- Make sure there's at least one winning path

Create the story with this theme: {theme}

Output your story in this exact JSON structure:
{{
    "title": "Story Title",
    "rootNode": {{
        "content": "The starting situation of the story",
        "isEnding": false,
        "isWinningEnding": false,
        "options": [
            {{
                "text": "Option 1 text",
                "nextNode": {{
                    "content": "What happens for option 1",
                    "isEnding": false,
                    "isWinningEnding": false,
                    "options": []
                }}
            }}
        ]
    }}
}}

Don't simplify or omit any part of the story structure.
Don't add any text outside of the JSON structure."#
    )
}
