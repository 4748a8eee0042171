use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{handlers, metrics_handler, state::AppState};

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler::metrics_endpoint))
}

pub fn part_routes() -> Router<AppState> {
    Router::new()
        .route("/api/parts", get(handlers::list_parts).post(handlers::create_part))
        .route("/api/parts/stats", get(handlers::get_stats))
        .route(
            "/api/parts/:id",
            get(handlers::get_part)
                .put(handlers::update_part)
                .delete(handlers::delete_part),
        )
        .route("/api/parts/:id/transition", post(handlers::transition_part))
        .route("/api/parts/:id/assign", post(handlers::assign_part))
        .route("/api/parts/:id/unassign", post(handlers::unassign_part))
}

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/api/parts/:id/upload",
        post(handlers::upload_part_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}
