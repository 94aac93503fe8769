use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::incidents::models::{
    Incident, IncidentCategory, IncidentDetail, IncidentFilter, IncidentHistory, IncidentStatus,
    IncidentSummary,
};
use crate::shared::types::optional_filter;
use crate::shared::validation::{validate_description, validate_not_blank};

/// Response DTO for incident
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentResponseDto {
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

impl From<Incident> for IncidentResponseDto {
    fn from(i: Incident) -> Self {
        Self {
            id: i.id,
            description: i.description,
            category: i.category,
            latitude: i.latitude,
            longitude: i.longitude,
            address: i.address,
            status: i.status,
            upvotes: i.upvotes,
            user_id: i.user_id,
            assigned_to_id: i.assigned_to_id,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Incident with reporter name and photo ids
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentListItemDto {
    #[serde(flatten)]
    pub incident: IncidentResponseDto,
    pub reporter_first_name: String,
    pub reporter_last_name: String,
    pub photo_ids: Vec<Uuid>,
}

impl From<IncidentSummary> for IncidentListItemDto {
    fn from(s: IncidentSummary) -> Self {
        Self {
            incident: s.incident.into(),
            reporter_first_name: s.reporter_first_name,
            reporter_last_name: s.reporter_last_name,
            photo_ids: s.photo_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentDetailDto {
    #[serde(flatten)]
    pub incident: IncidentListItemDto,
    pub comment_count: i64,
}

impl From<IncidentDetail> for IncidentDetailDto {
    fn from(d: IncidentDetail) -> Self {
        Self {
            incident: d.summary.into(),
            comment_count: d.comment_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentHistoryDto {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub changed_by_id: Uuid,
    pub old_status: IncidentStatus,
    pub new_status: IncidentStatus,
    pub changed_at: DateTime<Utc>,
}

impl From<IncidentHistory> for IncidentHistoryDto {
    fn from(h: IncidentHistory) -> Self {
        Self {
            id: h.id,
            incident_id: h.incident_id,
            changed_by_id: h.changed_by_id,
            old_status: h.old_status,
            new_status: h.new_status,
            changed_at: h.changed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteIncidentResponseDto {
    pub id: Uuid,
    pub deleted: bool,
}

/// Request DTO for reporting an incident
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIncidentDto {
    #[validate(
        length(min = 10, max = 1000, message = "Description must be 10 to 1000 characters"),
        custom(function = "validate_description")
    )]
    pub description: String,

    pub category: IncidentCategory,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[validate(
        length(max = 255, message = "Address must be at most 255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub address: Option<String>,

    /// Ids returned by `POST /api/photos`
    #[serde(default)]
    pub photo_ids: Vec<Uuid>,
}

/// Target status as a raw string so unknown values map to a 400
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateIncidentStatusDto {
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
}

impl UpdateIncidentStatusDto {
    pub fn parse(&self) -> Result<IncidentStatus> {
        self.status.parse::<IncidentStatus>().map_err(|_| {
            AppError::BadRequest("Invalid status".to_string())
                .with_details(serde_json::json!({ "status": self.status }))
        })
    }
}

/// `operator_id: null` removes the current assignment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignOperatorDto {
    pub operator_id: Option<Uuid>,
}

/// Query params for listing incidents
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListIncidentsQuery {
    /// Page number (1-indexed)
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Number of items per page
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,

    /// Status filter; `any` or empty means no filter
    #[serde(default, deserialize_with = "optional_filter")]
    #[param(value_type = Option<String>, example = "PENDING")]
    pub status: Option<IncidentStatus>,

    /// Category filter; `any` or empty means no filter
    #[serde(default, deserialize_with = "optional_filter")]
    #[param(value_type = Option<String>, example = "Potholes")]
    pub category: Option<IncidentCategory>,

    /// First creation day included (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,

    /// Last creation day included (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl ListIncidentsQuery {
    pub fn filter(&self) -> Result<IncidentFilter> {
        let (created_from, created_before) = creation_window(self.start_date, self.end_date)?;

        Ok(IncidentFilter {
            status: self.status,
            category: self.category,
            reporter_id: None,
            created_from,
            created_before,
        })
    }
}

/// Convert an inclusive day range into `[from, before)` UTC bounds
pub(crate) fn creation_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AppError::BadRequest(
                "start_date must not be after end_date".to_string(),
            )
            .with_details(serde_json::json!({
                "start_date": start.to_string(),
                "end_date": end.to_string(),
            })));
        }
    }

    let from = start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc());
    let before = end
        .and_then(|d| d.succ_opt())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    Ok((from, before))
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Text matched against description, category and address
    pub query: Option<String>,

    /// Maximum number of results
    #[param(minimum = 1, maximum = 50)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TrendingQuery {
    /// Number of incidents to return
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_dto() -> CreateIncidentDto {
        CreateIncidentDto {
            description: "Street light is out on the corner".to_string(),
            category: IncidentCategory::StreetLighting,
            latitude: 45.8,
            longitude: 15.97,
            address: Some("Ilica 1".to_string()),
            photo_ids: vec![],
        }
    }

    #[test]
    fn test_create_dto_validation() {
        assert!(valid_dto().validate().is_ok());

        let mut dto = valid_dto();
        dto.description = "   short      ".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_dto();
        dto.latitude = 90.5;
        assert!(dto.validate().is_err());

        let mut dto = valid_dto();
        dto.longitude = -180.01;
        assert!(dto.validate().is_err());

        let mut dto = valid_dto();
        dto.address = Some("   ".to_string());
        assert!(dto.validate().is_err());

        let mut dto = valid_dto();
        dto.address = None;
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_status_dto_rejects_unknown_values() {
        let dto = UpdateIncidentStatusDto {
            status: "CLOSED".to_string(),
        };
        let err = dto.parse().unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        assert!(err.to_string().contains("Invalid status"));

        let dto = UpdateIncidentStatusDto {
            status: "RESOLVED".to_string(),
        };
        assert_eq!(dto.parse().unwrap(), IncidentStatus::Resolved);
    }

    #[test]
    fn test_creation_window_is_inclusive_of_end_day() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1);
        let end = NaiveDate::from_ymd_opt(2025, 3, 31);
        let (from, before) = creation_window(start, end).unwrap();

        assert_eq!(from, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert_eq!(before, Some(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_creation_window_rejects_inverted_range() {
        let err = creation_window(
            NaiveDate::from_ymd_opt(2025, 4, 2),
            NaiveDate::from_ymd_opt(2025, 4, 1),
        )
        .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[test]
    fn test_list_query_treats_any_as_no_filter() {
        let query: ListIncidentsQuery =
            serde_json::from_str(r#"{"status": "any", "category": "Garbage"}"#).unwrap();
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.category, Some(IncidentCategory::Garbage));
    }
}
