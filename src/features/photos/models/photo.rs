use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub incident_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
    pub mime_type: String,
    pub size: i32,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub incident_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Outcome of storing a photo under the per-incident limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoInsert {
    Stored(Uuid),
    IncidentNotFound,
    LimitReached,
}
