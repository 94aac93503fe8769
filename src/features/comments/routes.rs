use crate::features::comments::handlers::comment_handler;
use crate::features::comments::services::CommentService;
use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

pub fn comment_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/incidents/{id}/comments",
            get(comment_handler::list_comments).post(comment_handler::create_comment),
        )
        .route(
            "/api/incidents/{id}/comments/{comment_id}",
            delete(comment_handler::delete_comment),
        )
        .with_state(service)
}
