use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{Role, User};

/// Caller resolved from a valid session token. The role always comes from
/// the users table, never from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }

    /// Operators and admins
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_operator()
    }
}

impl From<User> for AuthenticatedUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Reason a presented token was refused, kept in request extensions so that
/// protected handlers can report it.
#[derive(Debug, Clone)]
pub struct SessionRejection(pub String);
