//! Shared fixtures for unit and handler tests.
//!
//! [`InMemoryStore`] implements every repository trait over plain collections
//! behind one async mutex, so services run their real logic without Postgres.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{DateTime, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, SessionClaims};
use crate::features::auth::policy;
use crate::features::comments::models::{Comment, CommentDeletion, CommentWithAuthor, NewComment};
use crate::features::comments::repositories::CommentRepository;
use crate::features::incidents::dtos::CreateIncidentDto;
use crate::features::incidents::models::{
    ExportComment, ExportRow, Incident, IncidentCategory, IncidentCounts, IncidentDetail,
    IncidentFilter, IncidentHistory, IncidentStatus, IncidentSummary, NewIncident, StatusUpdate,
};
use crate::features::incidents::repositories::{
    status_change_forbidden, IncidentRepository, PgIncidentRepository,
};
use crate::features::photos::models::{NewPhoto, Photo, PhotoInsert};
use crate::features::photos::repositories::PhotoRepository;
use crate::features::users::models::{Role, User};
use crate::features::users::repositories::UserRepository;
use crate::features::votes::models::VoteState;
use crate::features::votes::repositories::VoteRepository;
use crate::shared::types::PageRequest;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-with-enough-entropy";

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Insertion order doubles as the tie-breaker for equal timestamps
    incidents: Vec<Incident>,
    history: Vec<IncidentHistory>,
    comments: Vec<Comment>,
    votes: HashSet<(Uuid, Uuid)>,
    photos: Vec<Photo>,
}

impl State {
    fn incident(&self, id: Uuid) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    fn incident_mut(&mut self, id: Uuid) -> Option<&mut Incident> {
        self.incidents.iter_mut().find(|i| i.id == id)
    }

    fn summary(&self, incident: &Incident) -> IncidentSummary {
        let reporter = self.users.get(&incident.user_id);
        IncidentSummary {
            incident: incident.clone(),
            reporter_first_name: reporter.map(|u| u.first_name.clone()).unwrap_or_default(),
            reporter_last_name: reporter.map(|u| u.last_name.clone()).unwrap_or_default(),
            photo_ids: self
                .photos
                .iter()
                .filter(|p| p.incident_id == Some(incident.id))
                .map(|p| p.id)
                .collect(),
        }
    }

    fn matches(incident: &Incident, filter: &IncidentFilter) -> bool {
        filter.status.is_none_or(|s| incident.status == s)
            && filter.category.is_none_or(|c| incident.category == c)
            && filter.reporter_id.is_none_or(|r| incident.user_id == r)
            && filter.created_from.is_none_or(|from| incident.created_at >= from)
            && filter
                .created_before
                .is_none_or(|before| incident.created_at < before)
    }

    /// Upvotes desc, then newest first
    fn ranked<'a>(&'a self, keep: impl Fn(&Incident) -> bool) -> Vec<&'a Incident> {
        let mut hits: Vec<(usize, &Incident)> = self
            .incidents
            .iter()
            .enumerate()
            .filter(|(_, i)| keep(*i))
            .collect();
        hits.sort_by(|(ia, a), (ib, b)| {
            b.upvotes
                .cmp(&a.upvotes)
                .then(b.created_at.cmp(&a.created_at))
                .then(ib.cmp(ia))
        });
        hits.into_iter().map(|(_, i)| i).collect()
    }

    fn author_names(&self, user_id: Uuid) -> (String, String) {
        self.users
            .get(&user_id)
            .map(|u| (u.first_name.clone(), u.last_name.clone()))
            .unwrap_or_default()
    }

    fn reply_count(&self, comment_id: Uuid) -> i64 {
        self.comments
            .iter()
            .filter(|c| c.parent_id == Some(comment_id))
            .count() as i64
    }

    fn with_author(&self, comment: &Comment) -> CommentWithAuthor {
        let (author_first_name, author_last_name) = self.author_names(comment.user_id);
        CommentWithAuthor {
            comment: comment.clone(),
            author_first_name,
            author_last_name,
            reply_count: self.reply_count(comment.id),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, first_name: &str, last_name: &str, role: Role) -> User {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let user = User {
            id,
            email: format!(
                "{}.{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                id.simple()
            ),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.users.insert(id, user.clone());
        user
    }

    pub async fn remove_user(&self, id: Uuid) {
        self.state.lock().await.users.remove(&id);
    }

    /// A PENDING pothole in Zagreb reported by `user_id`
    pub async fn add_incident(&self, user_id: Uuid, description: &str) -> Incident {
        let incident = sample_incident(user_id);
        let incident = Incident {
            description: description.to_string(),
            ..incident
        };
        self.state.lock().await.incidents.push(incident.clone());
        incident
    }

    pub async fn set_upvotes(&self, incident_id: Uuid, upvotes: i32) {
        if let Some(incident) = self.state.lock().await.incident_mut(incident_id) {
            incident.upvotes = upvotes;
        }
    }

    pub async fn add_photo(&self, uploaded_by: Uuid, incident_id: Option<Uuid>) -> Uuid {
        let photo = Photo {
            id: Uuid::new_v4(),
            incident_id,
            uploaded_by: Some(uploaded_by),
            mime_type: "image/jpeg".to_string(),
            size: 4,
            data: vec![0xFF, 0xD8, 0xFF, 0xD9],
            created_at: Utc::now(),
        };
        let id = photo.id;
        self.state.lock().await.photos.push(photo);
        id
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl IncidentRepository for InMemoryStore {
    async fn list(
        &self,
        filter: &IncidentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<IncidentSummary>, i64)> {
        let state = self.state.lock().await;
        let ranked = state.ranked(|i| State::matches(i, filter));
        let total = ranked.len() as i64;

        let items = ranked
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|i| state.summary(i))
            .collect();
        Ok((items, total))
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<IncidentSummary>> {
        let needle = query.to_lowercase();
        let state = self.state.lock().await;
        let ranked = state.ranked(|i| {
            i.description.to_lowercase().contains(&needle)
                || i.category.as_str().to_lowercase().contains(&needle)
                || i
                    .address
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle))
        });

        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|i| state.summary(i))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>> {
        Ok(self.state.lock().await.incident(id).cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<IncidentDetail>> {
        let state = self.state.lock().await;
        Ok(state.incident(id).map(|incident| IncidentDetail {
            summary: state.summary(incident),
            comment_count: state
                .comments
                .iter()
                .filter(|c| c.incident_id == id)
                .count() as i64,
        }))
    }

    async fn create(&self, new: NewIncident) -> Result<Incident> {
        let mut state = self.state.lock().await;

        let claimable = new.photo_ids.iter().all(|photo_id| {
            state.photos.iter().any(|p| {
                p.id == *photo_id && p.incident_id.is_none() && p.uploaded_by == Some(new.user_id)
            })
        });
        if !claimable {
            return Err(
                AppError::BadRequest("One or more photos cannot be attached".to_string())
                    .with_details(json!({ "photo_ids": new.photo_ids })),
            );
        }

        let now = Utc::now();
        let incident = Incident {
            id: Uuid::new_v4(),
            description: new.description,
            category: new.category,
            latitude: new.latitude,
            longitude: new.longitude,
            address: new.address,
            status: IncidentStatus::Pending,
            upvotes: 0,
            user_id: new.user_id,
            assigned_to_id: None,
            created_at: now,
            updated_at: now,
        };

        for photo in state.photos.iter_mut() {
            if new.photo_ids.contains(&photo.id) {
                photo.incident_id = Some(incident.id);
            }
        }
        state.incidents.push(incident.clone());

        Ok(incident)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.incidents.len();
        state.incidents.retain(|i| i.id != id);
        if state.incidents.len() == before {
            return Ok(false);
        }

        state.comments.retain(|c| c.incident_id != id);
        state.history.retain(|h| h.incident_id != id);
        state.votes.retain(|(incident_id, _)| *incident_id != id);
        state.photos.retain(|p| p.incident_id != Some(id));
        Ok(true)
    }

    async fn update_status(
        &self,
        id: Uuid,
        target: IncidentStatus,
        actor: &AuthenticatedUser,
    ) -> Result<StatusUpdate> {
        let mut state = self.state.lock().await;
        let incident = state.incident_mut(id).ok_or_else(|| {
            AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": id }))
        })?;

        if !policy::can_change_status(actor, incident) {
            return Err(status_change_forbidden(id));
        }

        if incident.status == target {
            return Ok(StatusUpdate {
                incident: incident.clone(),
                history: None,
            });
        }

        let now = Utc::now();
        let history = IncidentHistory {
            id: Uuid::new_v4(),
            incident_id: id,
            changed_by_id: actor.id,
            old_status: incident.status,
            new_status: target,
            changed_at: now,
        };
        incident.status = target;
        incident.updated_at = now;
        let incident = incident.clone();

        state.history.push(history.clone());
        Ok(StatusUpdate {
            incident,
            history: Some(history),
        })
    }

    async fn list_history(&self, id: Uuid) -> Result<Vec<IncidentHistory>> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|h| h.incident_id == id)
            .cloned()
            .collect())
    }

    async fn assign_operator(
        &self,
        id: Uuid,
        operator_id: Option<Uuid>,
    ) -> Result<Option<Incident>> {
        let mut state = self.state.lock().await;
        Ok(state.incident_mut(id).map(|incident| {
            incident.assigned_to_id = operator_id;
            incident.updated_at = Utc::now();
            incident.clone()
        }))
    }

    async fn export_rows(&self, filter: &IncidentFilter) -> Result<Vec<ExportRow>> {
        let state = self.state.lock().await;
        let mut matching: Vec<(usize, &Incident)> = state
            .incidents
            .iter()
            .enumerate()
            .filter(|(_, i)| State::matches(i, filter))
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        Ok(matching
            .into_iter()
            .map(|(_, incident)| {
                let summary = state.summary(incident);
                let comments = state
                    .comments
                    .iter()
                    .filter(|c| c.incident_id == incident.id)
                    .map(|c| {
                        let (author_first_name, author_last_name) = state.author_names(c.user_id);
                        ExportComment {
                            incident_id: c.incident_id,
                            author_first_name,
                            author_last_name,
                            content: c.content.clone(),
                            created_at: c.created_at,
                            deleted_at: c.deleted_at,
                        }
                    })
                    .collect();

                ExportRow {
                    id: incident.id,
                    description: incident.description.clone(),
                    category: incident.category,
                    address: incident.address.clone(),
                    status: incident.status,
                    latitude: incident.latitude,
                    longitude: incident.longitude,
                    reporter_first_name: summary.reporter_first_name,
                    reporter_last_name: summary.reporter_last_name,
                    reporter_email: state
                        .users
                        .get(&incident.user_id)
                        .map(|u| u.email.clone())
                        .unwrap_or_default(),
                    created_at: incident.created_at,
                    updated_at: incident.updated_at,
                    photo_count: summary.photo_ids.len() as i64,
                    comments,
                }
            })
            .collect())
    }

    async fn count_by_group(
        &self,
        from: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<IncidentCounts> {
        let state = self.state.lock().await;
        let mut by_category: HashMap<IncidentCategory, i64> = HashMap::new();
        let mut by_status: HashMap<IncidentStatus, i64> = HashMap::new();
        let mut total = 0;

        for incident in state
            .incidents
            .iter()
            .filter(|i| i.created_at >= from && i.created_at < before)
        {
            *by_category.entry(incident.category).or_default() += 1;
            *by_status.entry(incident.status).or_default() += 1;
            total += 1;
        }

        Ok(IncidentCounts {
            by_category: by_category.into_iter().collect(),
            by_status: by_status.into_iter().collect(),
            total,
        })
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_by_incident(&self, incident_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.incident_id == incident_id)
            .map(|c| state.with_author(c))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.lock().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, new: NewComment) -> Result<Option<CommentWithAuthor>> {
        let mut state = self.state.lock().await;
        if let Some(parent_id) = new.parent_id {
            let live_top_level = state.comments.iter().any(|p| {
                p.id == parent_id
                    && p.incident_id == new.incident_id
                    && p.parent_id.is_none()
                    && !p.is_deleted()
            });
            if !live_top_level {
                return Ok(None);
            }
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            incident_id: new.incident_id,
            user_id: new.user_id,
            parent_id: new.parent_id,
            content: new.content,
            created_at: Utc::now(),
            deleted_at: None,
        };
        state.comments.push(comment.clone());
        Ok(Some(state.with_author(&comment)))
    }

    async fn delete(&self, id: Uuid) -> Result<CommentDeletion> {
        let mut state = self.state.lock().await;
        let soft_deleted = state.reply_count(id) > 0;

        let index = state
            .comments
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| {
                AppError::NotFound("Comment not found".to_string())
                    .with_details(json!({ "comment_id": id }))
            })?;

        if soft_deleted {
            let comment = &mut state.comments[index];
            comment.deleted_at.get_or_insert_with(Utc::now);
        } else {
            state.comments.remove(index);
        }

        Ok(CommentDeletion { id, soft_deleted })
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn toggle(&self, incident_id: Uuid, user_id: Uuid) -> Result<VoteState> {
        let mut state = self.state.lock().await;
        if state.incident(incident_id).is_none() {
            return Err(AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": incident_id })));
        }

        let has_voted = state.votes.insert((incident_id, user_id));
        if !has_voted {
            state.votes.remove(&(incident_id, user_id));
        }

        let incident = state
            .incident_mut(incident_id)
            .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))?;
        incident.upvotes = (incident.upvotes + if has_voted { 1 } else { -1 }).max(0);

        Ok(VoteState {
            upvotes: incident.upvotes,
            has_voted,
        })
    }

    async fn has_voted(&self, incident_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .votes
            .contains(&(incident_id, user_id)))
    }
}

#[async_trait]
impl PhotoRepository for InMemoryStore {
    async fn create(&self, new: NewPhoto, max_per_incident: i64) -> Result<PhotoInsert> {
        let mut state = self.state.lock().await;
        if let Some(incident_id) = new.incident_id {
            if state.incident(incident_id).is_none() {
                return Ok(PhotoInsert::IncidentNotFound);
            }
            let attached = state
                .photos
                .iter()
                .filter(|p| p.incident_id == Some(incident_id))
                .count() as i64;
            if attached >= max_per_incident {
                return Ok(PhotoInsert::LimitReached);
            }
        }

        let photo = Photo {
            id: Uuid::new_v4(),
            incident_id: new.incident_id,
            uploaded_by: Some(new.uploaded_by),
            mime_type: new.mime_type,
            size: new.data.len() as i32,
            data: new.data,
            created_at: Utc::now(),
        };
        let id = photo.id;
        state.photos.push(photo);
        Ok(PhotoInsert::Stored(id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>> {
        let state = self.state.lock().await;
        Ok(state.photos.iter().find(|p| p.id == id).cloned())
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

// =============================================================================
// POSTGRES SEEDING (for #[sqlx::test] repository tests)
// =============================================================================

pub async fn insert_user(pool: &PgPool, role: Role) -> User {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, first_name, last_name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, first_name, last_name, role, created_at, updated_at
        "#,
    )
    .bind(format!("{}@example.com", Uuid::new_v4().simple()))
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn new_incident(user_id: Uuid, description: &str) -> NewIncident {
    NewIncident {
        description: description.to_string(),
        category: IncidentCategory::Potholes,
        latitude: 45.815,
        longitude: 15.982,
        address: None,
        user_id,
        photo_ids: Vec::new(),
    }
}

pub async fn insert_incident(pool: &PgPool, user_id: Uuid, description: &str) -> Incident {
    PgIncidentRepository::new(pool.clone())
        .create(new_incident(user_id, description))
        .await
        .unwrap()
}

pub fn authenticated(user: &User) -> AuthenticatedUser {
    AuthenticatedUser::from(user.clone())
}

/// A caller with random details that does not exist in any store
pub fn user_with_role(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        email: SafeEmail().fake(),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        role,
    }
}

pub fn sample_incident(user_id: Uuid) -> Incident {
    let now = Utc::now();
    Incident {
        id: Uuid::new_v4(),
        description: "Pothole in the middle of the road".to_string(),
        category: IncidentCategory::Potholes,
        latitude: 45.815,
        longitude: 15.982,
        address: Some("Trg bana Jelačića 1".to_string()),
        status: IncidentStatus::Pending,
        upvotes: 0,
        user_id,
        assigned_to_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_comment(user_id: Uuid) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        incident_id: Uuid::new_v4(),
        user_id,
        parent_id: None,
        content: "Noticed this too".to_string(),
        created_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn create_incident_dto(description: &str) -> CreateIncidentDto {
    CreateIncidentDto {
        description: description.to_string(),
        category: IncidentCategory::Potholes,
        latitude: 45.815,
        longitude: 15.982,
        address: Some("Ilica 1".to_string()),
        photo_ids: Vec::new(),
    }
}

/// Sign a session token; a negative `ttl_secs` yields an expired one.
pub fn sign_session_token(secret: &str, user_id: Uuid, email: &str, ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        email: email.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("session token should encode")
}

// =============================================================================
// ROUTER HELPERS
// =============================================================================

/// Make every request on `router` arrive as `user`, bypassing token checks.
pub fn with_user(router: Router, user: User) -> Router {
    let user = AuthenticatedUser::from(user);
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
