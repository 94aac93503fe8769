use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::core::error::Result;
use crate::features::incidents::models::{IncidentCategory, IncidentFilter, IncidentStatus};
use crate::shared::types::optional_filter;

use super::incident_dto::creation_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// Query params for exporting incidents
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Output format, `csv` (default) or `xlsx`
    #[serde(default)]
    #[param(value_type = Option<String>, example = "csv")]
    pub format: ExportFormat,

    #[serde(default, deserialize_with = "optional_filter")]
    #[param(value_type = Option<String>)]
    pub status: Option<IncidentStatus>,

    #[serde(default, deserialize_with = "optional_filter")]
    #[param(value_type = Option<String>)]
    pub category: Option<IncidentCategory>,

    /// First creation day included (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,

    /// Last creation day included (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl ExportQuery {
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
