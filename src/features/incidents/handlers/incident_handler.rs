use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::incidents::dtos::{
    AssignOperatorDto, CreateIncidentDto, DeleteIncidentResponseDto, IncidentDetailDto,
    IncidentHistoryDto, IncidentListItemDto, IncidentResponseDto, ListIncidentsQuery,
    SearchQuery, TrendingQuery, UpdateIncidentStatusDto,
};
use crate::features::incidents::services::IncidentService;
use crate::shared::types::{ApiResponse, Meta};

/// List incidents
///
/// Ordered by upvotes, then newest first.
#[utoipa::path(
    get,
    path = "/api/incidents",
    params(ListIncidentsQuery),
    responses(
        (status = 200, description = "Paginated incidents", body = ApiResponse<Vec<IncidentListItemDto>>),
        (status = 400, description = "Invalid filter")
    ),
    tag = "incidents"
)]
pub async fn list_incidents(
    State(service): State<Arc<IncidentService>>,
    Query(query): Query<ListIncidentsQuery>,
) -> Result<Json<ApiResponse<Vec<IncidentListItemDto>>>> {
    let (items, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// List incidents reported by the caller
#[utoipa::path(
    get,
    path = "/api/incidents/mine",
    params(ListIncidentsQuery),
    responses(
        (status = 200, description = "Paginated incidents of the caller", body = ApiResponse<Vec<IncidentListItemDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "incidents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_incidents(
    user: AuthenticatedUser,
    State(service): State<Arc<IncidentService>>,
    Query(query): Query<ListIncidentsQuery>,
) -> Result<Json<ApiResponse<Vec<IncidentListItemDto>>>> {
    let (items, meta) = service.list_mine(&user, &query).await?;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Search incidents by description, category or address
#[utoipa::path(
    get,
    path = "/api/incidents/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching incidents", body = ApiResponse<Vec<IncidentListItemDto>>)
    ),
    tag = "incidents"
)]
pub async fn search_incidents(
    State(service): State<Arc<IncidentService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<IncidentListItemDto>>>> {
    let items = service.search(&query).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Most upvoted incidents
#[utoipa::path(
    get,
    path = "/api/incidents/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending incidents", body = ApiResponse<Vec<IncidentListItemDto>>)
    ),
    tag = "incidents"
)]
pub async fn trending_incidents(
    State(service): State<Arc<IncidentService>>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<IncidentListItemDto>>>> {
    let items = service.trending(&query).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident found", body = ApiResponse<IncidentDetailDto>),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents"
)]
pub async fn get_incident(
    State(service): State<Arc<IncidentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IncidentDetailDto>>> {
    let incident = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(incident), None, None)))
}

/// Report a new incident
///
/// Photos uploaded beforehand through `POST /api/photos` are attached by id.
#[utoipa::path(
    post,
    path = "/api/incidents",
    request_body = CreateIncidentDto,
    responses(
        (status = 201, description = "Incident created", body = ApiResponse<IncidentResponseDto>),
        (status = 400, description = "Malformed body or photos cannot be attached"),
        (status = 401, description = "Authentication required"),
        (status = 422, description = "Validation error")
    ),
    tag = "incidents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_incident(
    user: AuthenticatedUser,
    State(service): State<Arc<IncidentService>>,
    AppJson(dto): AppJson<CreateIncidentDto>,
) -> Result<(StatusCode, Json<ApiResponse<IncidentResponseDto>>)> {
    dto.validate()?;

    let incident = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(incident),
            Some("Incident reported successfully".to_string()),
            None,
        )),
    ))
}

/// Delete an incident (reporter only)
#[utoipa::path(
    delete,
    path = "/api/incidents/{id}",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident deleted", body = ApiResponse<DeleteIncidentResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the reporter"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_incident(
    user: AuthenticatedUser,
    State(service): State<Arc<IncidentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteIncidentResponseDto>>> {
    let result = service.delete(&user, id).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Incident deleted successfully".to_string()),
        None,
    )))
}

/// Change incident status
///
/// Admins may update any incident, operators only those assigned to them.
#[utoipa::path(
    patch,
    path = "/api/incidents/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    request_body = UpdateIncidentStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<IncidentResponseDto>),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not allowed to update this incident"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_incident_status(
    user: AuthenticatedUser,
    State(service): State<Arc<IncidentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateIncidentStatusDto>,
) -> Result<Json<ApiResponse<IncidentResponseDto>>> {
    let incident = service.change_status(&user, id, &dto).await?;
    Ok(Json(ApiResponse::success(
        Some(incident),
        Some("Status updated successfully".to_string()),
        None,
    )))
}

/// Status change audit trail, oldest first
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Status history", body = ApiResponse<Vec<IncidentHistoryDto>>),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents"
)]
pub async fn get_incident_history(
    State(service): State<Arc<IncidentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<IncidentHistoryDto>>>> {
    let history = service.history(id).await?;
    let meta = Meta::total(history.len() as i64);
    Ok(Json(ApiResponse::success(Some(history), None, Some(meta))))
}

/// Assign or unassign the operator handling an incident (admin only)
#[utoipa::path(
    patch,
    path = "/api/incidents/{id}/assign",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    request_body = AssignOperatorDto,
    responses(
        (status = 200, description = "Assignment updated", body = ApiResponse<IncidentResponseDto>),
        (status = 400, description = "Assignee is not an operator"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_operator(
    user: AuthenticatedUser,
    State(service): State<Arc<IncidentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignOperatorDto>,
) -> Result<Json<ApiResponse<IncidentResponseDto>>> {
    let incident = service.assign_operator(&user, id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(incident), None, None)))
}
