mod export_dto;
mod incident_dto;
mod statistics_dto;

pub use export_dto::{ExportFormat, ExportQuery};
pub(crate) use incident_dto::creation_window;
pub use incident_dto::{
    AssignOperatorDto, CreateIncidentDto, DeleteIncidentResponseDto, IncidentDetailDto,
    IncidentHistoryDto, IncidentListItemDto, IncidentResponseDto, ListIncidentsQuery,
    SearchQuery, TrendingQuery, UpdateIncidentStatusDto,
};
pub use statistics_dto::{DateRangeDto, IncidentStatisticsDto, StatisticsQuery};
