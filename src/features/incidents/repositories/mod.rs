mod incident_repository;

pub(crate) use incident_repository::status_change_forbidden;
pub use incident_repository::{IncidentRepository, PgIncidentRepository};
