use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::votes::models::{VoteState, VoteStatus};
use crate::features::votes::services::VoteService;
use crate::shared::types::ApiResponse;

/// Toggle the caller's upvote
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/vote",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Vote toggled", body = ApiResponse<VoteState>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Incident not found")
    ),
    tag = "votes",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_vote(
    user: AuthenticatedUser,
    State(service): State<Arc<VoteService>>,
    Path(incident_id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoteState>>> {
    let state = service.toggle(&user, incident_id).await?;
    Ok(Json(ApiResponse::success(Some(state), None, None)))
}

/// Whether the caller has upvoted; always false without a session
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/vote-status",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Vote status", body = ApiResponse<VoteStatus>)
    ),
    tag = "votes"
)]
pub async fn get_vote_status(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<VoteService>>,
    Path(incident_id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoteStatus>>> {
    let status = service.status(user.as_ref(), incident_id).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}
