//! User identity and role lookup.
//!
//! Accounts are provisioned outside this service; it only reads them.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Profile and role of the authenticated user |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{PgUserRepository, UserRepository};
pub use services::UserService;
