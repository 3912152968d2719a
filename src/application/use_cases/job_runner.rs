use crate::application::use_cases::story_generator::StoryGeneratorUseCase;
use crate::infrastructure::db::JobStore;
use std::sync::Arc;
use tracing::{error, info};

/// Drives a story-generation job through its lifecycle:
/// pending -> processing -> completed / failed. Runs on a spawned task, so
/// every outcome is recorded on the job row rather than propagated.
pub struct JobRunnerUseCase {
    jobs: Arc<dyn JobStore + Send + Sync>,
    generator: Arc<StoryGeneratorUseCase>,
}

impl JobRunnerUseCase {
    pub fn new(
        jobs: Arc<dyn JobStore + Send + Sync>,
        generator: Arc<StoryGeneratorUseCase>,
    ) -> Self {
        Self { jobs, generator }
    }

    pub async fn run(&self, job_id: &str, session_id: &str, theme: &str) {
        info!(job_id, theme, "Starting story generation job");

        if let Err(e) = self.jobs.mark_processing(job_id).await {
            error!(job_id, error = %e, "Failed to mark job as processing");
            return;
        }

        match self.generator.execute(session_id, theme).await {
            Ok(story_id) => {
                if let Err(e) = self.jobs.mark_completed(job_id, story_id).await {
                    error!(job_id, story_id, error = %e, "Failed to mark job as completed");
                    return;
                }
                info!(job_id, story_id, "Story generation job completed");
            }
            Err(e) => {
                error!(job_id, error = %e, "Story generation job failed");
                if let Err(update_err) = self.jobs.mark_failed(job_id, &e.to_string()).await {
                    error!(job_id, error = %update_err, "Failed to mark job as failed");
                }
            }
        }
    }
}
