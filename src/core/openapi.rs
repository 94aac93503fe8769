use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::comments::{dtos as comments_dtos, handlers::comment_handler};
use crate::features::incidents::{
    dtos as incidents_dtos,
    handlers::{admin_handler, incident_handler},
    models as incidents_models,
};
use crate::features::photos::{dtos as photos_dtos, handlers::photo_handler};
use crate::features::users::{dtos as users_dtos, handlers::user_handler, models as users_models};
use crate::features::votes::{handlers::vote_handler, models as votes_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Incidents
        incident_handler::list_incidents,
        incident_handler::list_my_incidents,
        incident_handler::search_incidents,
        incident_handler::trending_incidents,
        incident_handler::get_incident,
        incident_handler::create_incident,
        incident_handler::delete_incident,
        incident_handler::update_incident_status,
        incident_handler::get_incident_history,
        incident_handler::assign_operator,
        // Comments
        comment_handler::list_comments,
        comment_handler::create_comment,
        comment_handler::delete_comment,
        // Votes
        vote_handler::toggle_vote,
        vote_handler::get_vote_status,
        // Photos
        photo_handler::upload_photo,
        photo_handler::get_photo,
        // Users
        user_handler::get_me,
        // Admin
        admin_handler::get_statistics,
        admin_handler::export_incidents,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Users
            users_models::Role,
            ApiResponse<users_dtos::UserResponseDto>,
            // Incidents
            incidents_models::IncidentStatus,
            incidents_models::IncidentCategory,
            incidents_dtos::CreateIncidentDto,
            incidents_dtos::UpdateIncidentStatusDto,
            incidents_dtos::AssignOperatorDto,
            ApiResponse<Vec<incidents_dtos::IncidentListItemDto>>,
            ApiResponse<incidents_dtos::IncidentDetailDto>,
            ApiResponse<incidents_dtos::IncidentResponseDto>,
            ApiResponse<incidents_dtos::DeleteIncidentResponseDto>,
            ApiResponse<Vec<incidents_dtos::IncidentHistoryDto>>,
            // Comments
            comments_dtos::CreateCommentDto,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<comments_dtos::DeleteCommentResponseDto>,
            // Votes
            ApiResponse<votes_models::VoteState>,
            ApiResponse<votes_models::VoteStatus>,
            // Photos
            photos_dtos::UploadPhotoDto,
            ApiResponse<photos_dtos::PhotoUploadResponseDto>,
            // Admin
            incidents_dtos::ExportFormat,
            incidents_dtos::DateRangeDto,
            ApiResponse<incidents_dtos::IncidentStatisticsDto>,
        )
    ),
    tags(
        (name = "incidents", description = "Incident reporting, browsing and triage"),
        (name = "comments", description = "Threaded incident comments"),
        (name = "votes", description = "Incident upvotes"),
        (name = "photos", description = "Incident photo upload and download"),
        (name = "users", description = "Current user"),
        (name = "admin", description = "Statistics and export (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Safe City API",
        version = "0.1.0",
        description = "API documentation for Safe City",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
