use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderValue, Method, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
};

use crate::{config::AppConfig, handlers, routes, state::AppState};

/// Assemble the full application router
///
/// Unmatched paths fall through to the static frontend when `STATIC_DIR`
/// points at a directory (with `index.html` as the SPA fallback), and to a
/// JSON 404 otherwise. Everything is mounted under `BASE_PATH`, and
/// `BASE_PATH/` redirects to `BASE_PATH`.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        .merge(routes::part_routes())
        .merge(routes::upload_routes(config.max_upload_bytes))
        .merge(routes::health_routes())
        .merge(routes::observability_routes());

    let api = match config.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        Some(dir) => {
            tracing::info!(static_dir = %dir.display(), "serving frontend assets");
            let index = ServeFile::new(dir.join("index.html"));
            api.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => api.fallback(handlers::route_not_found),
    };

    let app = api.with_state(state);
    let app = if config.base_path.is_empty() {
        app
    } else {
        let base_path = config.base_path.clone();
        Router::new()
            .nest(&config.base_path, app)
            .fallback(move |uri: Uri| base_path_fallback(base_path, uri))
    };

    app.layer(middleware::from_fn(request_logger))
        .layer(cors_layer(&config.cors_origins))
}

/// `nest` does not match the trailing-slash root of the mount point
async fn base_path_fallback(base_path: String, uri: Uri) -> Response {
    if uri.path().strip_suffix('/') == Some(base_path.as_str()) {
        return Redirect::permanent(&base_path).into_response();
    }
    handlers::route_not_found().await.into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn request_logger(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    crate::metrics::observe_http(method.as_str(), &path, status, elapsed.as_secs_f64());

    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}
