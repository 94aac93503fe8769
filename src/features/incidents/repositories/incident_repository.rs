use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy;
use crate::features::incidents::models::{
    ExportComment, ExportRow, Incident, IncidentCategory, IncidentCounts, IncidentDetail,
    IncidentFilter, IncidentHistory, IncidentStatus, IncidentSummary, NewIncident, StatusUpdate,
};
use crate::shared::types::PageRequest;
use crate::shared::validation::escape_like;

/// Storage for incidents, their status history and operator assignment
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// One page ordered by upvotes then recency, plus the unpaged total
    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<IncidentSummary>, i64)>;

    /// Case-insensitive literal substring match on description, category or address
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<IncidentSummary>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<IncidentDetail>>;

    /// Insert the incident and attach its photos atomically. Photos must be
    /// unattached and uploaded by the reporter.
    async fn create(&self, new: NewIncident) -> Result<Incident>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Lock the incident and authorize `actor` against the locked row. When
    /// the status differs, append one history row and update it in the same
    /// transaction.
    async fn update_status(
        &self,
        id: Uuid,
        target: IncidentStatus,
        actor: &AuthenticatedUser,
    ) -> Result<StatusUpdate>;

    /// Oldest first
    async fn list_history(&self, id: Uuid) -> Result<Vec<IncidentHistory>>;

    async fn assign_operator(&self, id: Uuid, operator_id: Option<Uuid>)
        -> Result<Option<Incident>>;

    /// Every matching incident, newest first, with comments and photo counts
    async fn export_rows(&self, filter: &IncidentFilter) -> Result<Vec<ExportRow>>;

    /// Counts for incidents created in `[from, before)`
    async fn count_by_group(
        &self,
        from: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<IncidentCounts>;
}

const INCIDENT_COLUMNS: &str = r#"
    id, description, category, latitude, longitude, address, status,
    upvotes, user_id, assigned_to_id, created_at, updated_at
"#;

const SUMMARY_SELECT: &str = r#"
    SELECT
        i.id, i.description, i.category, i.latitude, i.longitude, i.address, i.status,
        i.upvotes, i.user_id, i.assigned_to_id, i.created_at, i.updated_at,
        u.first_name AS reporter_first_name,
        u.last_name AS reporter_last_name,
        ARRAY(
            SELECT p.id FROM photos p
            WHERE p.incident_id = i.id
            ORDER BY p.created_at
        ) AS photo_ids
"#;

/// Binds $1..$5 from an [`IncidentFilter`]
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::incident_status IS NULL OR i.status = $1)
      AND ($2::incident_category IS NULL OR i.category = $2)
      AND ($3::uuid IS NULL OR i.user_id = $3)
      AND ($4::timestamptz IS NULL OR i.created_at >= $4)
      AND ($5::timestamptz IS NULL OR i.created_at < $5)
"#;

pub struct PgIncidentRepository {
    pool: PgPool,
}

impl PgIncidentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn status_change_forbidden(id: Uuid) -> AppError {
    AppError::Forbidden(
        "Only admins or the assigned operator can update this incident".to_string(),
    )
    .with_details(json!({ "incident_id": id }))
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        tracing::error!("Failed to {}: {:?}", context, e);
        AppError::Database(e)
    }
}

#[async_trait]
impl IncidentRepository for PgIncidentRepository {
    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<IncidentSummary>, i64)> {
        let count_sql = format!("SELECT COUNT(*) FROM incidents i {}", FILTER_CLAUSE);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.status)
            .bind(filter.category)
            .bind(filter.reporter_id)
            .bind(filter.created_from)
            .bind(filter.created_before)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count incidents"))?;

        let list_sql = format!(
            r#"
            {}
            FROM incidents i
            JOIN users u ON u.id = i.user_id
            {}
            ORDER BY i.upvotes DESC, i.created_at DESC
            OFFSET $6 LIMIT $7
            "#,
            SUMMARY_SELECT, FILTER_CLAUSE
        );
        let items = sqlx::query_as::<_, IncidentSummary>(&list_sql)
            .bind(filter.status)
            .bind(filter.category)
            .bind(filter.reporter_id)
            .bind(filter.created_from)
            .bind(filter.created_before)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list incidents"))?;

        Ok((items, total))
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<IncidentSummary>> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"
            {}
            FROM incidents i
            JOIN users u ON u.id = i.user_id
            WHERE i.description ILIKE $1 ESCAPE '\'
               OR i.category::text ILIKE $1 ESCAPE '\'
               OR i.address ILIKE $1 ESCAPE '\'
            ORDER BY i.upvotes DESC, i.created_at DESC
            LIMIT $2
            "#,
            SUMMARY_SELECT
        );

        sqlx::query_as::<_, IncidentSummary>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("search incidents"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>> {
        let sql = format!("SELECT {} FROM incidents WHERE id = $1", INCIDENT_COLUMNS);
        sqlx::query_as::<_, Incident>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch incident"))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<IncidentDetail>> {
        let sql = format!(
            r#"
            {},
                (SELECT COUNT(*) FROM comments c WHERE c.incident_id = i.id) AS comment_count
            FROM incidents i
            JOIN users u ON u.id = i.user_id
            WHERE i.id = $1
            "#,
            SUMMARY_SELECT
        );

        sqlx::query_as::<_, IncidentDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch incident detail"))
    }

    async fn create(&self, new: NewIncident) -> Result<Incident> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;

        let insert_sql = format!(
            r#"
            INSERT INTO incidents (description, category, latitude, longitude, address, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        );
        let incident = sqlx::query_as::<_, Incident>(&insert_sql)
            .bind(&new.description)
            .bind(new.category)
            .bind(new.latitude)
            .bind(new.longitude)
            .bind(&new.address)
            .bind(new.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("insert incident"))?;

        if !new.photo_ids.is_empty() {
            let attached = sqlx::query(
                r#"
                UPDATE photos
                SET incident_id = $1
                WHERE id = ANY($2)
                  AND incident_id IS NULL
                  AND uploaded_by = $3
                "#,
            )
            .bind(incident.id)
            .bind(&new.photo_ids)
            .bind(new.user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("attach photos"))?
            .rows_affected();

            if attached != new.photo_ids.len() as u64 {
                // Dropping the transaction rolls the insert back
                return Err(
                    AppError::BadRequest("One or more photos cannot be attached".to_string())
                        .with_details(json!({ "photo_ids": new.photo_ids })),
                );
            }
        }

        tx.commit().await.map_err(db_error("commit incident"))?;

        Ok(incident)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete incident"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        id: Uuid,
        target: IncidentStatus,
        actor: &AuthenticatedUser,
    ) -> Result<StatusUpdate> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;

        let lock_sql = format!(
            "SELECT {} FROM incidents WHERE id = $1 FOR UPDATE",
            INCIDENT_COLUMNS
        );
        let current = sqlx::query_as::<_, Incident>(&lock_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock incident"))?
            .ok_or_else(|| {
                AppError::NotFound("Incident not found".to_string())
                    .with_details(json!({ "incident_id": id }))
            })?;

        if !policy::can_change_status(actor, &current) {
            return Err(status_change_forbidden(id));
        }

        if current.status == target {
            tx.commit().await.map_err(db_error("commit status"))?;
            return Ok(StatusUpdate {
                incident: current,
                history: None,
            });
        }

        let history = sqlx::query_as::<_, IncidentHistory>(
            r#"
            INSERT INTO incident_history (incident_id, changed_by_id, old_status, new_status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, incident_id, changed_by_id, old_status, new_status, changed_at
            "#,
        )
        .bind(id)
        .bind(actor.id)
        .bind(current.status)
        .bind(target)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("insert incident history"))?;

        let update_sql = format!(
            r#"
            UPDATE incidents
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        );
        let incident = sqlx::query_as::<_, Incident>(&update_sql)
            .bind(id)
            .bind(target)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("update incident status"))?;

        tx.commit().await.map_err(db_error("commit status"))?;

        Ok(StatusUpdate {
            incident,
            history: Some(history),
        })
    }

    async fn list_history(&self, id: Uuid) -> Result<Vec<IncidentHistory>> {
        sqlx::query_as::<_, IncidentHistory>(
            r#"
            SELECT id, incident_id, changed_by_id, old_status, new_status, changed_at
            FROM incident_history
            WHERE incident_id = $1
            ORDER BY changed_at ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list incident history"))
    }

    async fn assign_operator(
        &self,
        id: Uuid,
        operator_id: Option<Uuid>,
    ) -> Result<Option<Incident>> {
        let sql = format!(
            r#"
            UPDATE incidents
            SET assigned_to_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        );

        sqlx::query_as::<_, Incident>(&sql)
            .bind(id)
            .bind(operator_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("assign operator"))
    }

    async fn export_rows(&self, filter: &IncidentFilter) -> Result<Vec<ExportRow>> {
        let sql = format!(
            r#"
            SELECT
                i.id, i.description, i.category, i.address, i.status,
                i.latitude, i.longitude,
                u.first_name AS reporter_first_name,
                u.last_name AS reporter_last_name,
                u.email AS reporter_email,
                i.created_at, i.updated_at,
                (SELECT COUNT(*) FROM photos p WHERE p.incident_id = i.id) AS photo_count
            FROM incidents i
            JOIN users u ON u.id = i.user_id
            {}
            ORDER BY i.created_at DESC
            "#,
            FILTER_CLAUSE
        );
        let mut rows = sqlx::query_as::<_, ExportRow>(&sql)
            .bind(filter.status)
            .bind(filter.category)
            .bind(filter.reporter_id)
            .bind(filter.created_from)
            .bind(filter.created_before)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("export incidents"))?;

        if rows.is_empty() {
            return Ok(rows);
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let comments = sqlx::query_as::<_, ExportComment>(
            r#"
            SELECT
                c.incident_id,
                u.first_name AS author_first_name,
                u.last_name AS author_last_name,
                c.content, c.created_at, c.deleted_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.incident_id = ANY($1)
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("export comments"))?;

        let mut by_incident: HashMap<Uuid, Vec<ExportComment>> = HashMap::new();
        for comment in comments {
            by_incident
                .entry(comment.incident_id)
                .or_default()
                .push(comment);
        }
        for row in &mut rows {
            row.comments = by_incident.remove(&row.id).unwrap_or_default();
        }

        Ok(rows)
    }

    async fn count_by_group(
        &self,
        from: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<IncidentCounts> {
        let by_category = sqlx::query_as::<_, (IncidentCategory, i64)>(
            r#"
            SELECT category, COUNT(*)
            FROM incidents
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY category
            "#,
        )
        .bind(from)
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("count incidents by category"))?;

        let by_status = sqlx::query_as::<_, (IncidentStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM incidents
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY status
            "#,
        )
        .bind(from)
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("count incidents by status"))?;

        let total = by_category.iter().map(|(_, count)| count).sum();

        Ok(IncidentCounts {
            by_category,
            by_status,
            total,
        })
    }
}
