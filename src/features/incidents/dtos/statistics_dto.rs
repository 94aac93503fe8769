use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query params for statistics. Without dates the last 30 days are used.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StatisticsQuery {
    /// First creation day included (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,

    /// Last creation day included (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Creation days covered, both inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRangeDto {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Incident counts over a creation-date window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentStatisticsDto {
    /// Count per category label, zero-filled
    pub by_category: BTreeMap<String, i64>,
    /// Count per status, zero-filled
    pub by_status: BTreeMap<String, i64>,
    pub total: i64,
    pub date_range: DateRangeDto,
}
