//! Incident photos, stored in the database.
//!
//! Photos are uploaded before or after the incident they belong to. An upload
//! without an incident stays unattached until `POST /api/incidents` claims it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/photos` | Upload a photo (multipart) |
//! | GET | `/api/photos/{id}` | Raw image bytes |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgPhotoRepository;
pub use services::PhotoService;
