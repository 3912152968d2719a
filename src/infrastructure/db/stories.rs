use super::StoryStore;
use crate::domain::error::{AppError, Result};
use crate::domain::story::{Story, StoryNode, StoryOption};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::types::Json;

pub struct StoryRepository {
    pool: PgPool,
}

impl StoryRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }
}

#[async_trait]
impl StoryStore for StoryRepository {
    async fn insert_story(&self, title: &str, session_id: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO stories (title, session_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert story: {e}")))?;

        Ok(id)
    }

    async fn set_main_image(&self, story_id: i64, image: &str) -> Result<()> {
        sqlx::query("UPDATE stories SET main_image = $1 WHERE id = $2")
            .bind(image)
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to set story image: {e}")))?;

        Ok(())
    }

    async fn get_story(&self, story_id: i64) -> Result<Story> {
        let row = sqlx::query_as::<_, StoryEntity>(
            "SELECT id, title, session_id, created_at, main_image FROM stories WHERE id = $1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch story: {e}")))?;

        match row {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!("Story not found: {}", story_id))),
        }
    }

    async fn insert_node(
        &self,
        story_id: i64,
        content: &str,
        is_root: bool,
        is_ending: bool,
        is_winning_ending: bool,
    ) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO story_nodes (story_id, content, is_root, is_ending, is_winning_ending) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(story_id)
        .bind(content)
        .bind(is_root)
        .bind(is_ending)
        .bind(is_winning_ending)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert story node: {e}")))?;

        Ok(id)
    }

    async fn set_node_image(&self, node_id: i64, image: &str) -> Result<()> {
        sqlx::query("UPDATE story_nodes SET image = $1 WHERE id = $2")
            .bind(image)
            .bind(node_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to set node image: {e}")))?;

        Ok(())
    }

    async fn set_node_options(&self, node_id: i64, options: &[StoryOption]) -> Result<()> {
        sqlx::query("UPDATE story_nodes SET options = $1 WHERE id = $2")
            .bind(Json(options))
            .bind(node_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to set node options: {e}")))?;

        Ok(())
    }

    async fn list_nodes(&self, story_id: i64) -> Result<Vec<StoryNode>> {
        let rows = sqlx::query_as::<_, NodeEntity>(
            "SELECT id, story_id, content, is_root, is_ending, is_winning_ending, options, image \
             FROM story_nodes WHERE story_id = $1 ORDER BY id",
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list story nodes: {e}")))?;

        Ok(rows.into_iter().map(|entity| entity.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct StoryEntity {
    id: i64,
    title: String,
    session_id: String,
    created_at: DateTime<Utc>,
    main_image: Option<String>,
}

impl From<StoryEntity> for Story {
    fn from(entity: StoryEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            session_id: entity.session_id,
            created_at: entity.created_at,
            main_image: entity.main_image,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NodeEntity {
    id: i64,
    story_id: i64,
    content: String,
    is_root: bool,
    is_ending: bool,
    is_winning_ending: bool,
    options: Json<Vec<StoryOption>>,
    image: Option<String>,
}

impl From<NodeEntity> for StoryNode {
    fn from(entity: NodeEntity) -> Self {
        Self {
            id: entity.id,
            story_id: entity.story_id,
            content: entity.content,
            is_root: entity.is_root,
            is_ending: entity.is_ending,
            is_winning_ending: entity.is_winning_ending,
            options: entity.options.0,
            image: entity.image,
        }
    }
}
