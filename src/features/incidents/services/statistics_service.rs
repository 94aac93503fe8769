use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::core::error::{AppError, Result};
use crate::features::incidents::dtos::{
    creation_window, DateRangeDto, IncidentStatisticsDto, StatisticsQuery,
};
use crate::features::incidents::models::{IncidentCategory, IncidentStatus};
use crate::features::incidents::repositories::IncidentRepository;
use crate::shared::constants::DEFAULT_STATISTICS_WINDOW_DAYS;

/// Aggregate incident counts for the admin dashboard
pub struct StatisticsService {
    incidents: Arc<dyn IncidentRepository>,
}

/// Timestamps counted, `[from, before)`, and the days reported back
#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    from: DateTime<Utc>,
    before: DateTime<Utc>,
    range: DateRangeDto,
}

impl StatisticsService {
    pub fn new(incidents: Arc<dyn IncidentRepository>) -> Self {
        Self { incidents }
    }

    /// Missing bounds default to the trailing window ending at `now`
    fn window(query: &StatisticsQuery, now: DateTime<Utc>) -> Result<Window> {
        let (from, before) = creation_window(query.start_date, query.end_date)?;
        let span = Duration::days(DEFAULT_STATISTICS_WINDOW_DAYS);
        let today = now.date_naive();

        let window = match (query.start_date, from, query.end_date, before) {
            (Some(start), Some(from), Some(end), Some(before)) => Window {
                from,
                before,
                range: DateRangeDto { start, end },
            },
            (Some(start), Some(from), None, _) => {
                if start > today {
                    return Err(AppError::BadRequest(
                        "start_date must not be in the future".to_string(),
                    )
                    .with_details(json!({ "start_date": start.to_string() })));
                }
                Window {
                    from,
                    before: now,
                    range: DateRangeDto { start, end: today },
                }
            }
            (None, _, Some(end), Some(before)) => {
                let from = before - span;
                Window {
                    from,
                    before,
                    range: DateRangeDto {
                        start: from.date_naive(),
                        end,
                    },
                }
            }
            _ => {
                let from = now - span;
                Window {
                    from,
                    before: now,
                    range: DateRangeDto {
                        start: from.date_naive(),
                        end: today,
                    },
                }
            }
        };

        Ok(window)
    }

    pub async fn statistics(
        &self,
        query: &StatisticsQuery,
        now: DateTime<Utc>,
    ) -> Result<IncidentStatisticsDto> {
        let window = Self::window(query, now)?;
        let counts = self
            .incidents
            .count_by_group(window.from, window.before)
            .await?;

        let mut by_category: BTreeMap<String, i64> = IncidentCategory::ALL
            .iter()
            .map(|c| (c.to_string(), 0))
            .collect();
        for (category, count) in counts.by_category {
            by_category.insert(category.to_string(), count);
        }

        let mut by_status: BTreeMap<String, i64> = IncidentStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for (status, count) in counts.by_status {
            by_status.insert(status.to_string(), count);
        }

        Ok(IncidentStatisticsDto {
            by_category,
            by_status,
            total: counts.total,
            date_range: window.range,
        })
    }
}
