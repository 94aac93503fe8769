use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::photos::dtos::{PhotoUploadResponseDto, UploadPhotoDto};
use crate::features::photos::services::PhotoService;
use crate::shared::types::ApiResponse;

const PHOTO_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Upload a photo
///
/// Accepts multipart/form-data with:
/// - `file`: the image (required)
/// - `incident_id`: incident to attach it to (optional)
#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "photos",
    request_body(
        content = UploadPhotoDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Photo uploaded", body = ApiResponse<PhotoUploadResponseDto>),
        (status = 400, description = "Missing, oversized or unsupported file"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Incident not found"),
        (status = 413, description = "Request body too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_photo(
    user: AuthenticatedUser,
    State(service): State<Arc<PhotoService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PhotoUploadResponseDto>>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut incident_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some((content_type, data.to_vec()));
            }
            "incident_id" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read incident_id field: {}", e))
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    incident_id = Some(text.parse().map_err(|_| {
                        AppError::BadRequest("Invalid incident_id".to_string())
                    })?);
                }
            }
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let response = service
        .upload(&user, incident_id, &content_type, data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("Photo uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Raw photo bytes
#[utoipa::path(
    get,
    path = "/api/photos/{id}",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Photo not found")
    )
)]
pub async fn get_photo(
    State(service): State<Arc<PhotoService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let photo = service.get(id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.mime_type),
            (header::CONTENT_LENGTH, photo.data.len().to_string()),
            (header::CACHE_CONTROL, PHOTO_CACHE_CONTROL.to_string()),
        ],
        photo.data,
    )
        .into_response())
}
