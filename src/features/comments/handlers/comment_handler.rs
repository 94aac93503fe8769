use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    CommentResponseDto, CreateCommentDto, DeleteCommentResponseDto,
};
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta};

/// List comments of an incident, oldest first
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 404, description = "Incident not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(service): State<Arc<CommentService>>,
    Path(incident_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = service.list(incident_id).await?;
    let meta = Meta::total(comments.len() as i64);
    Ok(Json(ApiResponse::success(Some(comments), None, Some(meta))))
}

/// Comment on an incident, or reply to a top-level comment
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Parent comment is invalid"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Incident not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(incident_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()?;

    let comment = service.create(&user, incident_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(comment),
            Some("Comment added successfully".to_string()),
            None,
        )),
    ))
}

/// Delete a comment (author or staff)
///
/// Comments with replies are kept with their content hidden.
#[utoipa::path(
    delete,
    path = "/api/incidents/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Incident ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<DeleteCommentResponseDto>),
        (status = 400, description = "Comment does not belong to incident"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not allowed to delete this comment"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path((incident_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DeleteCommentResponseDto>>> {
    let result = service.delete(&user, incident_id, comment_id).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Comment deleted successfully".to_string()),
        None,
    )))
}
