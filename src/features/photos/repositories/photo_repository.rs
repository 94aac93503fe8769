use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::photos::models::{NewPhoto, Photo, PhotoInsert};

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Store the photo. When it targets an incident, the incident row is
    /// locked so the count against `max_per_incident` and the insert cannot
    /// interleave with another upload.
    async fn create(&self, new: NewPhoto, max_per_incident: i64) -> Result<PhotoInsert>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>>;
}

pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        tracing::error!("Failed to {}: {:?}", context, e);
        AppError::Database(e)
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn create(&self, new: NewPhoto, max_per_incident: i64) -> Result<PhotoInsert> {
        let size = i32::try_from(new.data.len())
            .map_err(|_| AppError::BadRequest("File is too large".to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;

        if let Some(incident_id) = new.incident_id {
            let locked = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM incidents WHERE id = $1 FOR UPDATE",
            )
            .bind(incident_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock incident"))?;

            if locked.is_none() {
                return Ok(PhotoInsert::IncidentNotFound);
            }

            let attached = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM photos WHERE incident_id = $1",
            )
            .bind(incident_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("count incident photos"))?;

            if attached >= max_per_incident {
                return Ok(PhotoInsert::LimitReached);
            }
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO photos (incident_id, uploaded_by, mime_type, size, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(new.incident_id)
        .bind(new.uploaded_by)
        .bind(&new.mime_type)
        .bind(size)
        .bind(&new.data)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("store photo"))?;

        tx.commit().await.map_err(db_error("commit photo"))?;

        Ok(PhotoInsert::Stored(id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, incident_id, uploaded_by, mime_type, size, data, created_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch photo {}: {:?}", id, e);
            AppError::Database(e)
        })
    }
}
