use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::IncidentStatus;

/// Append-only audit record of a status change
#[derive(Debug, Clone, FromRow)]
pub struct IncidentHistory {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub changed_by_id: Uuid,
    pub old_status: IncidentStatus,
    pub new_status: IncidentStatus,
    pub changed_at: DateTime<Utc>,
}
