use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy;
use crate::features::comments::dtos::{
    CommentResponseDto, CreateCommentDto, DeleteCommentResponseDto,
};
use crate::features::comments::models::NewComment;
use crate::features::comments::repositories::CommentRepository;
use crate::features::incidents::repositories::IncidentRepository;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    incidents: Arc<dyn IncidentRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        incidents: Arc<dyn IncidentRepository>,
    ) -> Self {
        Self {
            comments,
            incidents,
        }
    }

    async fn require_incident(&self, incident_id: Uuid) -> Result<()> {
        match self.incidents.find_by_id(incident_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Incident not found".to_string())
                .with_details(json!({ "incident_id": incident_id }))),
        }
    }

    /// Whole thread, oldest first
    pub async fn list(&self, incident_id: Uuid) -> Result<Vec<CommentResponseDto>> {
        self.require_incident(incident_id).await?;

        let comments = self.comments.list_by_incident(incident_id).await?;
        Ok(comments.into_iter().map(Into::into).collect())
    }

    /// Expects an already validated DTO. A reply must target a live top-level
    /// comment on the same incident.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        incident_id: Uuid,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        self.require_incident(incident_id).await?;

        let parent_id = dto.parent_id;
        let comment = self
            .comments
            .create(NewComment {
                incident_id,
                user_id: user.id,
                parent_id,
                content: dto.content.trim().to_string(),
            })
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Parent comment is invalid".to_string())
                    .with_details(json!({ "parent_id": parent_id }))
            })?;

        tracing::info!(
            "Comment {} added to incident {} by user {}",
            comment.comment.id,
            incident_id,
            user.id
        );

        Ok(comment.into())
    }

    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        incident_id: Uuid,
        comment_id: Uuid,
    ) -> Result<DeleteCommentResponseDto> {
        let comment = self.comments.find_by_id(comment_id).await?.ok_or_else(|| {
            AppError::NotFound("Comment not found".to_string())
                .with_details(json!({ "comment_id": comment_id }))
        })?;

        if comment.incident_id != incident_id {
            return Err(
                AppError::BadRequest("Comment does not belong to incident".to_string())
                    .with_details(json!({
                        "comment_id": comment_id,
                        "incident_id": incident_id
                    })),
            );
        }

        if !policy::can_delete_comment(user, &comment) {
            return Err(
                AppError::Forbidden("Cannot delete another user's comment".to_string())
                    .with_details(json!({ "comment_id": comment_id })),
            );
        }

        let deletion = self.comments.delete(comment_id).await?;

        tracing::info!(
            "Comment {} deleted by user {} (soft: {})",
            comment_id,
            user.id,
            deletion.soft_deleted
        );

        Ok(deletion.into())
    }
}
