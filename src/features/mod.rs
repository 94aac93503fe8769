pub mod auth;
pub mod comments;
pub mod incidents;
pub mod photos;
pub mod users;
pub mod votes;
