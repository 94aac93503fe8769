use crate::features::votes::handlers::vote_handler;
use crate::features::votes::services::VoteService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn vote_routes(service: Arc<VoteService>) -> Router {
    Router::new()
        .route("/api/incidents/{id}/vote", post(vote_handler::toggle_vote))
        .route(
            "/api/incidents/{id}/vote-status",
            get(vote_handler::get_vote_status),
        )
        .with_state(service)
}
