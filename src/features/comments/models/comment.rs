use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for comment. `deleted_at` marks a soft delete.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub author_first_name: String,
    pub author_last_name: String,
    pub reply_count: i64,
}

/// Data for creating a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub incident_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

/// Outcome of a delete: soft when the comment still has replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentDeletion {
    pub id: Uuid,
    pub soft_deleted: bool,
}
