//! Threaded incident comments.
//!
//! Replies go one level deep. Deleting a comment that has replies only hides
//! its content so the thread stays readable.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/incidents/{id}/comments` | Comments, oldest first |
//! | POST | `/api/incidents/{id}/comments` | Comment or reply |
//! | DELETE | `/api/incidents/{id}/comments/{comment_id}` | Delete (author or staff) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgCommentRepository;
pub use services::CommentService;
