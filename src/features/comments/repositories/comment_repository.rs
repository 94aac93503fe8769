use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::{
    Comment, CommentDeletion, CommentWithAuthor, NewComment,
};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Oldest first, including soft-deleted comments
    async fn list_by_incident(&self, incident_id: Uuid) -> Result<Vec<CommentWithAuthor>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Insert unless `parent_id` names something other than a live top-level
    /// comment on the same incident, in which case nothing is written and
    /// `None` is returned. The parent check and the insert are one statement.
    async fn create(&self, new: NewComment) -> Result<Option<CommentWithAuthor>>;

    /// Soft delete when the comment has replies, hard delete otherwise.
    /// Decided and applied under a row lock.
    async fn delete(&self, id: Uuid) -> Result<CommentDeletion>;
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.kind() == sqlx::error::ErrorKind::ForeignKeyViolation)
}

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_by_incident(&self, incident_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT
                c.id, c.incident_id, c.user_id, c.parent_id, c.content,
                c.created_at, c.deleted_at,
                u.first_name AS author_first_name,
                u.last_name AS author_last_name,
                (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.incident_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(incident_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments for incident {}: {:?}", incident_id, e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, incident_id, user_id, parent_id, content, created_at, deleted_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch comment {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn create(&self, new: NewComment) -> Result<Option<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (incident_id, user_id, parent_id, content)
                SELECT $1, $2, $3, $4
                WHERE $3::uuid IS NULL
                   OR EXISTS (
                       SELECT 1 FROM comments p
                       WHERE p.id = $3
                         AND p.incident_id = $1
                         AND p.parent_id IS NULL
                         AND p.deleted_at IS NULL
                       FOR KEY SHARE
                   )
                RETURNING id, incident_id, user_id, parent_id, content, created_at, deleted_at
            )
            SELECT
                i.id, i.incident_id, i.user_id, i.parent_id, i.content,
                i.created_at, i.deleted_at,
                u.first_name AS author_first_name,
                u.last_name AS author_last_name,
                0::BIGINT AS reply_count
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(new.incident_id)
        .bind(new.user_id)
        .bind(new.parent_id)
        .bind(&new.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            // The incident went away after the caller looked it up
            if is_foreign_key_violation(&e) {
                return AppError::NotFound("Incident not found".to_string())
                    .with_details(json!({ "incident_id": new.incident_id }));
            }
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<CommentDeletion> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM comments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock comment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if locked.is_none() {
            return Err(AppError::NotFound("Comment not found".to_string())
                .with_details(json!({ "comment_id": id })));
        }

        let replies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count replies of comment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        let soft_deleted = replies > 0;
        let sql = if soft_deleted {
            "UPDATE comments SET deleted_at = COALESCE(deleted_at, NOW()) WHERE id = $1"
        } else {
            "DELETE FROM comments WHERE id = $1"
        };

        sqlx::query(sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit comment deletion: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(CommentDeletion { id, soft_deleted })
    }
}
