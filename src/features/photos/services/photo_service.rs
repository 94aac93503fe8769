use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::config::IncidentsConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::photos::dtos::PhotoUploadResponseDto;
use crate::features::photos::models::{NewPhoto, Photo, PhotoInsert};
use crate::features::photos::repositories::PhotoRepository;
use crate::shared::constants::ALLOWED_PHOTO_MIME_TYPES;

pub struct PhotoService {
    photos: Arc<dyn PhotoRepository>,
    config: IncidentsConfig,
}

/// Lowercased MIME type without parameters
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl PhotoService {
    pub fn new(photos: Arc<dyn PhotoRepository>, config: IncidentsConfig) -> Self {
        Self { photos, config }
    }

    pub fn max_photo_size(&self) -> usize {
        self.config.max_photo_size
    }

    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        incident_id: Option<Uuid>,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<PhotoUploadResponseDto> {
        if data.is_empty() {
            return Err(AppError::BadRequest("File is required".to_string()));
        }

        if data.len() > self.config.max_photo_size {
            return Err(AppError::BadRequest(format!(
                "File cannot exceed {}MB",
                self.config.max_photo_size / 1024 / 1024
            ))
            .with_details(json!({ "size": data.len() })));
        }

        let mime_type = normalize_mime_type(content_type);
        if !ALLOWED_PHOTO_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(AppError::BadRequest("Unsupported file type".to_string())
                .with_details(json!({
                    "mime_type": mime_type,
                    "allowed": ALLOWED_PHOTO_MIME_TYPES
                })));
        }

        let size = data.len();
        let insert = self
            .photos
            .create(
                NewPhoto {
                    incident_id,
                    uploaded_by: user.id,
                    mime_type,
                    data,
                },
                self.config.max_photos_per_incident as i64,
            )
            .await?;

        let photo_id = match insert {
            PhotoInsert::Stored(id) => id,
            PhotoInsert::IncidentNotFound => {
                return Err(AppError::NotFound("Incident not found".to_string())
                    .with_details(json!({ "incident_id": incident_id })));
            }
            PhotoInsert::LimitReached => {
                return Err(AppError::BadRequest(format!(
                    "At most {} photos can be attached to an incident",
                    self.config.max_photos_per_incident
                ))
                .with_details(json!({ "incident_id": incident_id })));
            }
        };

        tracing::info!(
            "Photo {} ({} bytes) uploaded by user {}",
            photo_id,
            size,
            user.id
        );

        Ok(PhotoUploadResponseDto { photo_id })
    }

    pub async fn get(&self, id: Uuid) -> Result<Photo> {
        self.photos.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Photo not found".to_string())
                .with_details(json!({ "photo_id": id }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{authenticated, InMemoryStore};

    fn service(store: &Arc<InMemoryStore>) -> PhotoService {
        PhotoService::new(store.clone(), IncidentsConfig::default())
    }

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("image/PNG"), "image/png");
        assert_eq!(normalize_mime_type(" image/jpeg; q=1"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_and_fetch() {
        let store = Arc::new(InMemoryStore::new());
        let user = authenticated(&store.add_user("Ivo", "Horvat", Role::Citizen).await);
        let service = service(&store);

        let uploaded = service
            .upload(&user, None, "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        let photo = service.get(uploaded.photo_id).await.unwrap();
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(photo.data, vec![1, 2, 3]);
        assert_eq!(photo.size, 3);
        assert_eq!(photo.uploaded_by, Some(user.id));
        assert_eq!(photo.incident_id, None);
    }

    #[tokio::test]
    async fn test_rejects_oversized_and_wrong_type() {
        let store = Arc::new(InMemoryStore::new());
        let user = authenticated(&store.add_user("Ivo", "Horvat", Role::Citizen).await);
        let service = service(&store);

        let too_big = vec![0u8; IncidentsConfig::default().max_photo_size + 1];
        let err = service
            .upload(&user, None, "image/jpeg", too_big)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = service
            .upload(&user, None, "application/pdf", vec![1])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_photo_limit_per_incident() {
        let store = Arc::new(InMemoryStore::new());
        let owner = store.add_user("Ivo", "Horvat", Role::Citizen).await;
        let user = authenticated(&owner);
        let incident = store.add_incident(owner.id, "Damaged playground swing").await;
        let service = service(&store);

        for _ in 0..IncidentsConfig::default().max_photos_per_incident {
            service
                .upload(&user, Some(incident.id), "image/webp", vec![7])
                .await
                .unwrap();
        }

        let err = service
            .upload(&user, Some(incident.id), "image/webp", vec![7])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = service
            .upload(&user, Some(Uuid::new_v4()), "image/webp", vec![7])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_photo() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store).get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
