use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lipi Hindi OCR API",
        version = "0.1.0",
        description = "Extract Hindi (Devanagari) text from images supplied as file uploads, URLs or base64 strings.",
    ),
    paths(
        handlers::system::service_info,
        handlers::system::health_check,
        handlers::ocr::extract_upload,
        handlers::ocr::extract_url,
        handlers::ocr::extract_base64,
        handlers::ocr::model_info,
    ),
    components(schemas(
        // Error envelope
        response::ErrorCode,
        response::ErrorResponse,
        // OCR
        dto::ocr::ExtractUrlRequest,
        dto::ocr::ExtractBase64Request,
        dto::ocr::OcrResponse,
        dto::ocr::ImageInfoResponse,
        dto::ocr::ModelInfoResponse,
        // System
        dto::system::ServiceInfo,
        dto::system::HealthResponse,
    )),
    tags(
        (name = "system", description = "Service info and health"),
        (name = "ocr", description = "Text extraction from images"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
