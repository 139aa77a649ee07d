use std::collections::BTreeMap;

use axum::extract::State;
use chrono::{SecondsFormat, Utc};

use crate::api::dto::{HealthResponse, ServiceInfo};
use crate::api::response::ApiResponse;
use crate::api::state::AppState;

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service name, version and endpoint map", body = ServiceInfo),
    )
)]
pub async fn service_info(State(state): State<AppState>) -> ApiResponse<ServiceInfo> {
    let endpoints: BTreeMap<String, String> = [
        ("health", "/health"),
        ("extract_file", "/api/ocr/extract"),
        ("extract_url", "/api/ocr/extract-url"),
        ("extract_base64", "/api/ocr/extract-base64"),
        ("model_info", "/api/ocr/model-info"),
        ("docs", "/docs"),
        ("openapi", "/openapi.json"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ApiResponse::success(ServiceInfo {
        name: "Lipi Hindi OCR API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        model: state.extraction.provider().model_name().to_string(),
        endpoints,
    })
}

/// `GET /health`
///
/// Always answers 200 so the process is not restarted just because the
/// OCR backend is missing; `status` tells the two cases apart.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let provider = state.extraction.provider();
    let model_loaded = provider.is_available();

    ApiResponse::success(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        model_loaded,
        model_name: provider.model_name().to_string(),
        backend: provider.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
