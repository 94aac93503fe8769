//! Session authentication and authorization.
//!
//! Session tokens are issued elsewhere. This module validates them, resolves
//! the caller against the users table and decides what the caller may do.

mod validator;

pub mod guards;
pub mod model;
pub mod policy;
pub mod services;

pub use services::AuthService;
pub use validator::JwtValidator;
