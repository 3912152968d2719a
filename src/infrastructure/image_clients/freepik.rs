use crate::domain::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://api.freepik.com/v1/ai/mystic";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);
const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(30);
const COVER_PACING_DELAY: Duration = Duration::from_secs(2);
const NODE_PACING_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    #[serde(default)]
    data: TaskData,
}

#[derive(Debug, Default, Deserialize)]
struct TaskData {
    #[serde(default)]
    task_id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    generated: Vec<String>,
    #[serde(default)]
    has_nsfw: Vec<bool>,
}

/// Client for the Freepik Mystic image-generation API. Generation is
/// asynchronous on the Freepik side: a task is submitted, then polled until
/// it completes, and the first generated image is downloaded and returned
/// base64-encoded with its MIME type prefix.
pub struct FreepikClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_wait: Duration,
    rate_limit_backoff: Duration,
    cover_delay: Duration,
    node_delay: Duration,
}

impl FreepikClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            cover_delay: COVER_PACING_DELAY,
            node_delay: NODE_PACING_DELAY,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Disables the pacing delays and the 429 backoff. Intended for tests.
    pub fn without_pacing(mut self) -> Self {
        self.rate_limit_backoff = Duration::ZERO;
        self.cover_delay = Duration::ZERO;
        self.node_delay = Duration::ZERO;
        self
    }

    /// Generates a cover image for a story and returns it base64-encoded.
    pub async fn generate_story_image(
        &self,
        title: &str,
        content: &str,
        theme: &str,
    ) -> Result<String> {
        tokio::time::sleep(self.cover_delay).await;

        let prompt = format!(
            "Create a detailed, cinematic illustration for a {} adventure story titled '{}'. \
             Scene: {}. Style: Book cover quality, atmospheric, mysterious, adventurous. \
             High detail, rich colors, fantasy art style.",
            theme,
            title,
            truncate(content, 200)
        );

        self.generate(&prompt).await
    }

    /// Generates an illustration for a single story node.
    pub async fn generate_node_image(&self, content: &str, theme: &str) -> Result<String> {
        tokio::time::sleep(self.node_delay).await;

        let prompt = format!(
            "Create a detailed, cinematic illustration for a {} story scene. \
             Scene: {}. Style: Story illustration, atmospheric, engaging, immersive. \
             High detail, rich colors, fantasy art style.",
            theme,
            truncate(content, 200)
        );

        self.generate(&prompt).await
    }

    /// Fetches the raw status payload for a generation task.
    pub async fn check_status(&self, task_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), task_id);
        let response = self
            .client
            .get(&url)
            .header("x-freepik-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ImageError(format!("Status request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ImageError(format!(
                "Failed to check status ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ImageError(format!("Failed to parse status JSON: {}", e)))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let task_id = self.submit_task(prompt).await?;
        info!(task_id = %task_id, "Started image generation");

        let data = self.poll_until_complete(&task_id).await?;
        let image_url = data
            .generated
            .first()
            .ok_or_else(|| AppError::ImageError("No generated images in response".to_string()))?;

        self.download_and_encode(image_url).await
    }

    async fn submit_task(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "prompt": prompt.trim(),
            "structure_reference": "",
            "structure_strength": 50,
            "style_reference": "",
            "adherence": 50,
            "hdr": 50,
            "resolution": "2k",
            "aspect_ratio": "square_1_1",
            "model": "realism",
            "creative_detailing": 33,
            "engine": "automatic",
            "fixed_generation": false,
            "filter_nsfw": true,
            "styling": {
                "styles": [],
                "characters": [],
                "colors": [
                    { "color": "#4A90E2", "weight": 0.5 }
                ]
            }
        });

        let mut response = self.post_task(&payload).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                backoff_secs = self.rate_limit_backoff.as_secs(),
                "Rate limited by Freepik API, retrying after backoff"
            );
            tokio::time::sleep(self.rate_limit_backoff).await;
            response = self.post_task(&payload).await?;
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ImageError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let envelope: TaskEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::ImageError(format!("Failed to parse JSON: {}", e)))?;

        if envelope.data.task_id.is_empty() {
            return Err(AppError::ImageError(
                "Invalid response from Freepik API: missing task_id".to_string(),
            ));
        }

        Ok(envelope.data.task_id)
    }

    async fn post_task(&self, payload: &serde_json::Value) -> Result<reqwest::Response> {
        self.client
            .post(&self.base_url)
            .header("x-freepik-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::ImageError(format!("Request failed: {}", e)))
    }

    async fn poll_until_complete(&self, task_id: &str) -> Result<TaskData> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), task_id);
        let started = tokio::time::Instant::now();

        while started.elapsed() < self.max_wait {
            let response = self
                .client
                .get(&url)
                .header("x-freepik-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| AppError::ImageError(format!("Status request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(AppError::ImageError(format!(
                    "Failed to check status ({}): {}",
                    status, text
                )));
            }

            let envelope: TaskEnvelope = response
                .json()
                .await
                .map_err(|e| AppError::ImageError(format!("Failed to parse status JSON: {}", e)))?;
            let data = envelope.data;

            debug!(task_id = %task_id, status = %data.status, "Polled generation status");

            match data.status.as_str() {
                "COMPLETED" => {
                    if data.generated.is_empty() {
                        return Err(AppError::ImageError(
                            "Generation completed but no images generated".to_string(),
                        ));
                    }
                    if data.has_nsfw.iter().any(|flag| *flag) {
                        return Err(AppError::ImageError(
                            "NSFW content detected in generated image(s)".to_string(),
                        ));
                    }
                    return Ok(data);
                }
                "CREATED" | "IN_PROGRESS" => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(AppError::ImageError(format!(
                        "Generation failed with unexpected status '{}'",
                        other
                    )));
                }
            }
        }

        Err(AppError::ImageError(format!(
            "Generation timed out after {} seconds for task {}",
            self.max_wait.as_secs(),
            task_id
        )))
    }

    async fn download_and_encode(&self, image_url: &str) -> Result<String> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| AppError::ImageError(format!("Image download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ImageError(format!(
                "Image download failed with status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| "image/png".to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ImageError(format!("Failed to read image bytes: {}", e)))?;

        Ok(format!("{};base64,{}", content_type, BASE64.encode(&bytes)))
    }
}

fn truncate(content: &str, max_chars: usize) -> String {
    content.chars().take(max_chars).collect()
}
