use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::IncidentHistory;

/// Incident status matching the `incident_status` database enum.
///
/// Any status may move to any other; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Pending,
        IncidentStatus::InProgress,
        IncidentStatus::Resolved,
        IncidentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "PENDING",
            IncidentStatus::InProgress => "IN_PROGRESS",
            IncidentStatus::Resolved => "RESOLVED",
            IncidentStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown incident status: {}", s))
    }
}

/// Closed set of incident categories matching the `incident_category` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_category")]
pub enum IncidentCategory {
    #[serde(rename = "Street Lighting")]
    #[sqlx(rename = "Street Lighting")]
    StreetLighting,
    Potholes,
    Garbage,
    #[serde(rename = "Illegal Parking")]
    #[sqlx(rename = "Illegal Parking")]
    IllegalParking,
    Other,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 5] = [
        IncidentCategory::StreetLighting,
        IncidentCategory::Potholes,
        IncidentCategory::Garbage,
        IncidentCategory::IllegalParking,
        IncidentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::StreetLighting => "Street Lighting",
            IncidentCategory::Potholes => "Potholes",
            IncidentCategory::Garbage => "Garbage",
            IncidentCategory::IllegalParking => "Illegal Parking",
            IncidentCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        IncidentCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown incident category: {}", s))
    }
}

/// Database model for incident
#[derive(Debug, Clone, FromRow)]
pub struct Incident {
    pub id: Uuid,
    pub description: String,
    pub category: IncidentCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub status: IncidentStatus,
    pub upvotes: i32,
    pub user_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incident joined with its reporter and photo ids, as shown in listings
#[derive(Debug, Clone, FromRow)]
pub struct IncidentSummary {
    #[sqlx(flatten)]
    pub incident: Incident,
    pub reporter_first_name: String,
    pub reporter_last_name: String,
    pub photo_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct IncidentDetail {
    #[sqlx(flatten)]
    pub summary: IncidentSummary,
    pub comment_count: i64,
}

/// Data for creating a new incident
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub description: String,
    pub category: IncidentCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub user_id: Uuid,
    pub photo_ids: Vec<Uuid>,
}

/// Listing filters. `created_before` is exclusive.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub category: Option<IncidentCategory>,
    pub reporter_id: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Outcome of a status change. `history` is `None` when the target equals
/// the current status.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub incident: Incident,
    pub history: Option<IncidentHistory>,
}
