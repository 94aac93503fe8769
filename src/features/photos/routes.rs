use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::photos::handlers::photo_handler;
use crate::features::photos::services::PhotoService;

/// Headroom for multipart boundaries and the other form fields
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn photo_routes(service: Arc<PhotoService>) -> Router {
    let body_limit = service.max_photo_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/photos",
            post(photo_handler::upload_photo).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/photos/{id}", get(photo_handler::get_photo))
        .with_state(service)
}
