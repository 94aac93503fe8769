use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{IncidentCategory, IncidentStatus};

/// One incident flattened for export
#[derive(Debug, Clone, FromRow)]
pub struct ExportRow {
    pub id: Uuid,
    pub description: String,
    pub category: IncidentCategory,
    pub address: Option<String>,
    pub status: IncidentStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub reporter_first_name: String,
    pub reporter_last_name: String,
    pub reporter_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub photo_count: i64,
    #[sqlx(skip)]
    pub comments: Vec<ExportComment>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExportComment {
    pub incident_id: Uuid,
    pub author_first_name: String,
    pub author_last_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Grouped incident counts over a creation-date window
#[derive(Debug, Clone, Default)]
pub struct IncidentCounts {
    pub by_category: Vec<(IncidentCategory, i64)>,
    pub by_status: Vec<(IncidentStatus, i64)>,
    pub total: i64,
}
