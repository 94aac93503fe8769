use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::incidents::dtos::{ExportQuery, IncidentStatisticsDto, StatisticsQuery};
use crate::features::incidents::services::{ExportService, StatisticsService};
use crate::shared::types::ApiResponse;

/// Incident counts by category and status (admin only)
///
/// Defaults to the last 30 days when no dates are given.
#[utoipa::path(
    get,
    path = "/api/admin/statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Incident statistics", body = ApiResponse<IncidentStatisticsDto>),
        (status = 400, description = "start_date after end_date"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_statistics(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatisticsService>>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<ApiResponse<IncidentStatisticsDto>>> {
    let stats = service.statistics(&query, Utc::now()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Download incidents as CSV or XLSX (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/incidents/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV or XLSX file attachment"),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_incidents(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ExportService>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let file = service.export(&query, Utc::now().date_naive()).await?;
    tracing::info!("Incident export {} requested by {}", file.file_name, admin.id);

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
