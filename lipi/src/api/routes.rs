use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{handlers, openapi, AppState};

/// Extra room on top of the base64-inflated image for JSON or multipart
/// framing.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Largest request body accepted: a base64 encoding of the biggest allowed
/// image plus framing.
pub fn body_limit(max_image_size: usize) -> usize {
    max_image_size.saturating_mul(4) / 3 + BODY_OVERHEAD
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let limit = body_limit(state.config.image.max_image_size);

    let ocr = Router::new()
        .route("/extract", post(handlers::ocr::extract_upload))
        .route("/extract-url", post(handlers::ocr::extract_url))
        .route("/extract-base64", post(handlers::ocr::extract_base64))
        .route("/model-info", get(handlers::ocr::model_info));

    Router::new()
        .route("/", get(handlers::system::service_info))
        .route("/health", get(handlers::system::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .nest("/api/ocr", ocr)
        .layer(DefaultBodyLimit::max(limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
