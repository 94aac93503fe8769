use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::votes::models::VoteState;

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Add the vote when absent, remove it when present, adjusting the
    /// incident counter under a row lock.
    async fn toggle(&self, incident_id: Uuid, user_id: Uuid) -> Result<VoteState>;

    async fn has_voted(&self, incident_id: Uuid, user_id: Uuid) -> Result<bool>;
}

pub struct PgVoteRepository {
    pool: PgPool,
}

impl PgVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    async fn toggle(&self, incident_id: Uuid, user_id: Uuid) -> Result<VoteState> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM incidents WHERE id = $1 FOR UPDATE",
        )
        .bind(incident_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock incident {}: {:?}", incident_id, e);
            AppError::Database(e)
        })?;

        if locked.is_none() {
            return Err(AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": incident_id })));
        }

        let removed = sqlx::query(
            "DELETE FROM incident_votes WHERE incident_id = $1 AND user_id = $2",
        )
        .bind(incident_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove vote: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected()
            > 0;

        let delta: i32 = if removed {
            -1
        } else {
            sqlx::query("INSERT INTO incident_votes (incident_id, user_id) VALUES ($1, $2)")
                .bind(incident_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert vote: {:?}", e);
                    AppError::Database(e)
                })?;
            1
        };

        let upvotes = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE incidents
            SET upvotes = GREATEST(upvotes + $2, 0)
            WHERE id = $1
            RETURNING upvotes
            "#,
        )
        .bind(incident_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update upvotes of incident {}: {:?}", incident_id, e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit vote toggle: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(VoteState {
            upvotes,
            has_voted: !removed,
        })
    }

    async fn has_voted(&self, incident_id: Uuid, user_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM incident_votes WHERE incident_id = $1 AND user_id = $2)",
        )
        .bind(incident_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check vote: {:?}", e);
            AppError::Database(e)
        })
    }
}
