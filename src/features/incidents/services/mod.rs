mod export_service;
mod incident_service;
mod statistics_service;

pub use export_service::ExportService;
pub use incident_service::IncidentService;
pub use statistics_service::StatisticsService;
