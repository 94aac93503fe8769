use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::JwtValidator;
use crate::features::users::repositories::UserRepository;

/// Resolves bearer tokens to users
pub struct AuthService {
    validator: JwtValidator,
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(validator: JwtValidator, users: Arc<dyn UserRepository>) -> Self {
        Self { validator, users }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.validator.validate_token(token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{sign_session_token, InMemoryStore, TEST_SESSION_SECRET};
    use uuid::Uuid;

    fn service(store: &Arc<InMemoryStore>) -> AuthService {
        AuthService::new(JwtValidator::new(TEST_SESSION_SECRET, 0), store.clone())
    }

    #[tokio::test]
    async fn test_role_is_loaded_from_storage() {
        let store = Arc::new(InMemoryStore::new());
        let admin = store.add_user("Root", "Admin", Role::Admin).await;
        let token = sign_session_token(TEST_SESSION_SECRET, admin.id, &admin.email, 600);

        let user = service(&store).authenticate(&token).await.unwrap();
        assert_eq!(user.id, admin.id);
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthorized() {
        let store = Arc::new(InMemoryStore::new());
        let token = sign_session_token(TEST_SESSION_SECRET, Uuid::new_v4(), "ghost@x.io", 600);

        let err = service(&store).authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
