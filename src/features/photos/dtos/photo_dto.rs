use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart form of `POST /api/photos`, for the OpenAPI document only.
/// The handler reads the fields with axum's `Multipart` extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoDto {
    /// JPEG, PNG or WebP image
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Incident to attach the photo to right away
    pub incident_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUploadResponseDto {
    pub photo_id: Uuid,
}
