use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::config::IncidentsConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy;
use crate::features::incidents::dtos::{
    AssignOperatorDto, CreateIncidentDto, DeleteIncidentResponseDto, IncidentDetailDto,
    IncidentHistoryDto, IncidentListItemDto, IncidentResponseDto, ListIncidentsQuery,
    SearchQuery, TrendingQuery, UpdateIncidentStatusDto,
};
use crate::features::incidents::models::{Incident, IncidentFilter, NewIncident};
use crate::features::incidents::repositories::IncidentRepository;
use crate::features::users::models::Role;
use crate::features::users::repositories::UserRepository;
use crate::shared::constants::DEFAULT_TRENDING_LIMIT;
use crate::shared::types::{Meta, PageRequest};

/// Incident reporting, browsing and triage
pub struct IncidentService {
    incidents: Arc<dyn IncidentRepository>,
    users: Arc<dyn UserRepository>,
    config: IncidentsConfig,
}

impl IncidentService {
    pub fn new(
        incidents: Arc<dyn IncidentRepository>,
        users: Arc<dyn UserRepository>,
        config: IncidentsConfig,
    ) -> Self {
        Self {
            incidents,
            users,
            config,
        }
    }

    fn page(&self, page: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest::resolve(
            page,
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    async fn require_incident(&self, id: Uuid) -> Result<Incident> {
        self.incidents.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": id }))
        })
    }

    // ========================================================================
    // Browsing
    // ========================================================================

    pub async fn list(&self, query: &ListIncidentsQuery) -> Result<(Vec<IncidentListItemDto>, Meta)> {
        let filter = query.filter()?;
        self.list_filtered(filter, query).await
    }

    /// Incidents reported by the caller
    pub async fn list_mine(
        &self,
        user: &AuthenticatedUser,
        query: &ListIncidentsQuery,
    ) -> Result<(Vec<IncidentListItemDto>, Meta)> {
        let filter = IncidentFilter {
            reporter_id: Some(user.id),
            ..query.filter()?
        };
        self.list_filtered(filter, query).await
    }

    async fn list_filtered(
        &self,
        filter: IncidentFilter,
        query: &ListIncidentsQuery,
    ) -> Result<(Vec<IncidentListItemDto>, Meta)> {
        let page = self.page(query.page, query.page_size);
        let (items, total) = self.incidents.list(&filter, &page).await?;

        let items = items.into_iter().map(Into::into).collect();
        Ok((items, Meta::paginated(total, &page)))
    }

    pub async fn get(&self, id: Uuid) -> Result<IncidentDetailDto> {
        let detail = self.incidents.find_detail(id).await?.ok_or_else(|| {
            AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": id }))
        })?;

        Ok(detail.into())
    }

    /// Blank queries match nothing
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<IncidentListItemDto>> {
        let text = query.query.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let max = self.config.search_max_results.max(1);
        let limit = query.limit.unwrap_or(max).clamp(1, max);

        let items = self.incidents.search(text, limit).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn trending(&self, query: &TrendingQuery) -> Result<Vec<IncidentListItemDto>> {
        let limit = query.limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
        let page = self.page(Some(1), Some(limit));

        let (items, _) = self
            .incidents
            .list(&IncidentFilter::default(), &page)
            .await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Expects an already validated DTO. New incidents always start PENDING.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateIncidentDto,
    ) -> Result<IncidentResponseDto> {
        let mut photo_ids = dto.photo_ids;
        photo_ids.sort();
        photo_ids.dedup();

        if photo_ids.len() > self.config.max_photos_per_incident {
            return Err(AppError::BadRequest(format!(
                "At most {} photos can be attached to an incident",
                self.config.max_photos_per_incident
            ))
            .with_details(json!({ "photo_count": photo_ids.len() })));
        }

        let incident = self
            .incidents
            .create(NewIncident {
                description: dto.description.trim().to_string(),
                category: dto.category,
                latitude: dto.latitude,
                longitude: dto.longitude,
                address: dto
                    .address
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty()),
                user_id: user.id,
                photo_ids,
            })
            .await?;

        tracing::info!(
            "Incident {} reported by user {} ({})",
            incident.id,
            user.id,
            incident.category
        );

        Ok(incident.into())
    }

    /// Only the reporter may delete; comments, votes, history and photos go with it
    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<DeleteIncidentResponseDto> {
        let incident = self.require_incident(id).await?;

        if !policy::can_delete_incident(user, &incident) {
            return Err(
                AppError::Forbidden("Cannot delete incident you do not own".to_string())
                    .with_details(json!({ "incident_id": id })),
            );
        }

        let deleted = self.incidents.delete(id).await?;
        if deleted {
            tracing::info!("Incident {} deleted by user {}", id, user.id);
        }

        Ok(DeleteIncidentResponseDto { id, deleted })
    }

    // ========================================================================
    // Triage
    // ========================================================================

    /// Setting the current status again is a no-op and records no history.
    pub async fn change_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: &UpdateIncidentStatusDto,
    ) -> Result<IncidentResponseDto> {
        let target = dto.parse()?;

        // Authorized by the repository against the locked row
        let update = self.incidents.update_status(id, target, user).await?;

        if let Some(history) = &update.history {
            tracing::info!(
                "Incident {} status changed {} -> {} by user {}",
                id,
                history.old_status,
                history.new_status,
                user.id
            );
        }

        Ok(update.incident.into())
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<IncidentHistoryDto>> {
        self.require_incident(id).await?;

        let rows = self.incidents.list_history(id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn assign_operator(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: &AssignOperatorDto,
    ) -> Result<IncidentResponseDto> {
        if !policy::can_assign_operator(user) {
            return Err(AppError::Forbidden(
                "Only admins can assign operators".to_string(),
            ));
        }

        self.require_incident(id).await?;

        if let Some(operator_id) = dto.operator_id {
            let operator = self.users.find_by_id(operator_id).await?;
            if !matches!(operator, Some(ref u) if u.role == Role::Operator) {
                return Err(
                    AppError::BadRequest("Assignee must be an operator".to_string())
                        .with_details(json!({ "operator_id": operator_id })),
                );
            }
        }

        let incident = self
            .incidents
            .assign_operator(id, dto.operator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))?;

        tracing::info!(
            "Incident {} assigned to {:?} by user {}",
            id,
            dto.operator_id,
            user.id
        );

        Ok(incident.into())
    }
}
