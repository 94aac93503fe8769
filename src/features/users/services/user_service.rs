use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::repositories::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Current profile of the authenticated user, re-read from storage
    pub async fn get_me(&self, user: &AuthenticatedUser) -> Result<UserResponseDto> {
        let found = self
            .users
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(found.into())
    }
}
