use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::{CommentDeletion, CommentWithAuthor};
use crate::shared::constants::DELETED_COMMENT_PLACEHOLDER;
use crate::shared::validation::validate_not_blank;

/// Response DTO for comment. Soft-deleted comments keep their place in the
/// thread with the content replaced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub reply_count: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentResponseDto {
    fn from(c: CommentWithAuthor) -> Self {
        let deleted = c.comment.is_deleted();
        Self {
            id: c.comment.id,
            incident_id: c.comment.incident_id,
            user_id: c.comment.user_id,
            parent_id: c.comment.parent_id,
            content: if deleted {
                DELETED_COMMENT_PLACEHOLDER.to_string()
            } else {
                c.comment.content
            },
            author_first_name: c.author_first_name,
            author_last_name: c.author_last_name,
            reply_count: c.reply_count,
            deleted,
            created_at: c.comment.created_at,
        }
    }
}

/// Request DTO for posting a comment or a reply
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(
        length(min = 1, max = 500, message = "Comment must be 1 to 500 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    /// Top-level comment being replied to
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteCommentResponseDto {
    pub id: Uuid,
    pub soft_deleted: bool,
}

impl From<CommentDeletion> for DeleteCommentResponseDto {
    fn from(d: CommentDeletion) -> Self {
        Self {
            id: d.id,
            soft_deleted: d.soft_deleted,
        }
    }
}
