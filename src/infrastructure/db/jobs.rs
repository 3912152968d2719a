use super::JobStore;
use crate::domain::error::{AppError, Result};
use crate::domain::job::{JobStatus, StoryJob};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        sqlx::query("UPDATE story_jobs SET status = $1 WHERE job_id = $2")
            .bind(status.as_str())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update job status: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn create(&self, job_id: &str, session_id: &str, theme: &str) -> Result<StoryJob> {
        let entity = sqlx::query_as::<_, JobEntity>(
            "INSERT INTO story_jobs (job_id, session_id, theme, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, job_id, session_id, theme, status, story_id, error, created_at, completed_at",
        )
        .bind(job_id)
        .bind(session_id)
        .bind(theme)
        .bind(JobStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create job: {e}")))?;

        entity.try_into()
    }

    async fn get(&self, job_id: &str) -> Result<StoryJob> {
        let row = sqlx::query_as::<_, JobEntity>(
            "SELECT id, job_id, session_id, theme, status, story_id, error, created_at, completed_at \
             FROM story_jobs WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch job: {e}")))?;

        match row {
            Some(entity) => entity.try_into(),
            None => Err(AppError::NotFound(format!("Job not found: {}", job_id))),
        }
    }

    async fn mark_processing(&self, job_id: &str) -> Result<()> {
        self.set_status(job_id, JobStatus::Processing).await
    }

    async fn mark_completed(&self, job_id: &str, story_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE story_jobs SET status = $1, story_id = $2, completed_at = now() \
             WHERE job_id = $3",
        )
        .bind(JobStatus::Completed.as_str())
        .bind(story_id)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to complete job: {e}")))?;

        Ok(())
    }

    async fn mark_failed(&self, job_id: &str, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE story_jobs SET status = $1, error = $2, completed_at = now() \
             WHERE job_id = $3",
        )
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark job failed: {e}")))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct JobEntity {
    id: i64,
    job_id: String,
    session_id: String,
    theme: String,
    status: String,
    story_id: Option<i64>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobEntity> for StoryJob {
    type Error = AppError;

    fn try_from(entity: JobEntity) -> Result<Self> {
        let status = JobStatus::parse(&entity.status).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown job status: {}", entity.status))
        })?;

        Ok(Self {
            id: entity.id,
            job_id: entity.job_id,
            session_id: entity.session_id,
            theme: entity.theme,
            status,
            story_id: entity.story_id,
            error: entity.error,
            created_at: entity.created_at,
            completed_at: entity.completed_at,
        })
    }
}
