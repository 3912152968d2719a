#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use storyforge::domain::error::{AppError, Result};
use storyforge::domain::job::{JobStatus, StoryJob};
use storyforge::domain::story::{Story, StoryNode, StoryOption};
use storyforge::infrastructure::db::{JobStore, StoryStore};
use storyforge::infrastructure::llm_clients::LLMClient;

pub struct StaticLLMClient {
    pub reply: String,
}

#[async_trait]
impl LLMClient for StaticLLMClient {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

pub struct FailingLLMClient;

#[async_trait]
impl LLMClient for FailingLLMClient {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
        Err(AppError::LLMError("API error (503): overloaded".to_string()))
    }
}

/// Three-level branching story: root -> mid node -> winning ending, plus a
/// losing ending directly off the root.
pub fn sample_story_json() -> &'static str {
    r#"{
        "title": "The Sunken Vault",
        "rootNode": {
            "content": "You stand before a flooded vault door.",
            "isEnding": false,
            "isWinningEnding": false,
            "options": [
                {
                    "text": "Dive in",
                    "nextNode": {
                        "content": "You surface inside a dark antechamber.",
                        "isEnding": false,
                        "isWinningEnding": false,
                        "options": [
                            {
                                "text": "Pry open the inner gate",
                                "nextNode": {
                                    "content": "You find the treasure.",
                                    "isEnding": true,
                                    "isWinningEnding": true,
                                    "options": []
                                }
                            }
                        ]
                    }
                },
                {
                    "text": "Walk away",
                    "nextNode": {
                        "content": "The vault seals forever.",
                        "isEnding": true,
                        "isWinningEnding": false,
                        "options": []
                    }
                }
            ]
        }
    }"#
}

#[derive(Default)]
struct StoryState {
    next_id: i64,
    stories: Vec<Story>,
    nodes: Vec<StoryNode>,
}

#[derive(Default)]
pub struct InMemoryStoryStore {
    state: Mutex<StoryState>,
}

impl InMemoryStoryStore {
    pub fn stories(&self) -> Vec<Story> {
        self.state.lock().unwrap().stories.clone()
    }

    pub fn nodes(&self) -> Vec<StoryNode> {
        self.state.lock().unwrap().nodes.clone()
    }
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    async fn insert_story(&self, title: &str, session_id: &str) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.stories.push(Story {
            id,
            title: title.to_string(),
            session_id: session_id.to_string(),
            created_at: Utc::now(),
            main_image: None,
        });
        Ok(id)
    }

    async fn set_main_image(&self, story_id: i64, image: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let story = state
            .stories
            .iter_mut()
            .find(|story| story.id == story_id)
            .ok_or_else(|| AppError::NotFound(format!("Story not found: {}", story_id)))?;
        story.main_image = Some(image.to_string());
        Ok(())
    }

    async fn get_story(&self, story_id: i64) -> Result<Story> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|story| story.id == story_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Story not found: {}", story_id)))
    }

    async fn insert_node(
        &self,
        story_id: i64,
        content: &str,
        is_root: bool,
        is_ending: bool,
        is_winning_ending: bool,
    ) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.nodes.push(StoryNode {
            id,
            story_id,
            content: content.to_string(),
            is_root,
            is_ending,
            is_winning_ending,
            options: Vec::new(),
            image: None,
        });
        Ok(id)
    }

    async fn set_node_image(&self, node_id: i64, image: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let node = state
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| AppError::NotFound(format!("Node not found: {}", node_id)))?;
        node.image = Some(image.to_string());
        Ok(())
    }

    async fn set_node_options(&self, node_id: i64, options: &[StoryOption]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let node = state
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| AppError::NotFound(format!("Node not found: {}", node_id)))?;
        node.options = options.to_vec();
        Ok(())
    }

    async fn list_nodes(&self, story_id: i64) -> Result<Vec<StoryNode>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .filter(|node| node.story_id == story_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct JobState {
    next_id: i64,
    jobs: Vec<StoryJob>,
}

#[derive(Default)]
pub struct InMemoryJobStore {
    state: Mutex<JobState>,
}

impl InMemoryJobStore {
    fn update<F>(&self, job_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut StoryJob),
    {
        let mut state = self.state.lock().unwrap();
        let job = state
            .jobs
            .iter_mut()
            .find(|job| job.job_id == job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;
        apply(job);
        Ok(())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job_id: &str, session_id: &str, theme: &str) -> Result<StoryJob> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let job = StoryJob {
            id: state.next_id,
            job_id: job_id.to_string(),
            session_id: session_id.to_string(),
            theme: theme.to_string(),
            status: JobStatus::Pending,
            story_id: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        state.jobs.push(job.clone());
        Ok(job)
    }

    async fn get(&self, job_id: &str) -> Result<StoryJob> {
        self.state
            .lock()
            .unwrap()
            .jobs
            .iter()
            .find(|job| job.job_id == job_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))
    }

    async fn mark_processing(&self, job_id: &str) -> Result<()> {
        self.update(job_id, |job| job.status = JobStatus::Processing)
    }

    async fn mark_completed(&self, job_id: &str, story_id: i64) -> Result<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Completed;
            job.story_id = Some(story_id);
            job.completed_at = Some(Utc::now());
        })
    }

    async fn mark_failed(&self, job_id: &str, error: &str) -> Result<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error.to_string());
            job.completed_at = Some(Utc::now());
        })
    }
}
