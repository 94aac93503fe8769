use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_me(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}
