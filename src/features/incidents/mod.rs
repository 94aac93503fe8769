//! Incident reporting, browsing, triage, export and statistics.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/incidents` | Paginated, filtered listing |
//! | POST | `/api/incidents` | Report an incident |
//! | GET | `/api/incidents/mine` | Incidents reported by the caller |
//! | GET | `/api/incidents/search` | Text search |
//! | GET | `/api/incidents/trending` | Most upvoted |
//! | GET | `/api/incidents/{id}` | Incident detail |
//! | DELETE | `/api/incidents/{id}` | Delete own incident |
//! | PATCH | `/api/incidents/{id}/status` | Change status (admin or assigned operator) |
//! | GET | `/api/incidents/{id}/history` | Status audit trail |
//! | PATCH | `/api/incidents/{id}/assign` | Assign operator (admin) |
//! | GET | `/api/admin/statistics` | Counts by category and status (admin) |
//! | GET | `/api/admin/incidents/export` | CSV/XLSX export (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{IncidentRepository, PgIncidentRepository};
pub use services::{ExportService, IncidentService, StatisticsService};
