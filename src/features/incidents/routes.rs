use crate::features::incidents::handlers::{admin_handler, incident_handler};
use crate::features::incidents::services::{ExportService, IncidentService, StatisticsService};
use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

pub fn incident_routes(service: Arc<IncidentService>) -> Router {
    Router::new()
        .route(
            "/api/incidents",
            get(incident_handler::list_incidents).post(incident_handler::create_incident),
        )
        .route("/api/incidents/mine", get(incident_handler::list_my_incidents))
        .route("/api/incidents/search", get(incident_handler::search_incidents))
        .route(
            "/api/incidents/trending",
            get(incident_handler::trending_incidents),
        )
        .route(
            "/api/incidents/{id}",
            get(incident_handler::get_incident).delete(incident_handler::delete_incident),
        )
        .route(
            "/api/incidents/{id}/status",
            patch(incident_handler::update_incident_status),
        )
        .route(
            "/api/incidents/{id}/history",
            get(incident_handler::get_incident_history),
        )
        .route(
            "/api/incidents/{id}/assign",
            patch(incident_handler::assign_operator),
        )
        .with_state(service)
}

pub fn admin_routes(
    statistics: Arc<StatisticsService>,
    export: Arc<ExportService>,
) -> Router {
    let statistics_router = Router::new()
        .route("/api/admin/statistics", get(admin_handler::get_statistics))
        .with_state(statistics);

    let export_router = Router::new()
        .route(
            "/api/admin/incidents/export",
            get(admin_handler::export_incidents),
        )
        .with_state(export);

    statistics_router.merge(export_router)
}
