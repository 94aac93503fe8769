mod incident;
mod incident_export;
mod incident_history;

pub use incident::{
    Incident, IncidentCategory, IncidentDetail, IncidentFilter, IncidentStatus, IncidentSummary,
    NewIncident, StatusUpdate,
};
pub use incident_export::{ExportComment, ExportRow, IncidentCounts};
pub use incident_history::IncidentHistory;
