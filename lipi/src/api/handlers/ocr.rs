//! OCR extraction handlers.
//!
//! All three input shapes end up in [`ExtractionService::extract`]; the
//! handlers only collect the source and options and apply the request
//! timeout.
//!
//! [`ExtractionService::extract`]: crate::services::ExtractionService::extract

use std::time::Duration;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use validator::Validate;

use crate::api::dto::{
    ExtractBase64Request, ExtractUrlRequest, ModelInfoResponse, OcrResponse,
};
use crate::api::extractors::AppJson;
use crate::api::response::{ApiResponse, ErrorCode, ErrorResponse};
use crate::api::state::AppState;
use crate::error::LipiError;
use crate::models::{ExtractOptions, ImageSource, MAX_MAX_LENGTH, MIN_MAX_LENGTH};

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn multipart_error(err: MultipartError, max_image_size: usize) -> LipiError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        LipiError::PayloadTooLarge(format!(
            "File too large. Maximum size: {}MB",
            max_image_size / (1024 * 1024)
        ))
    } else {
        LipiError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn parse_max_length(value: &str) -> Option<usize> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (MIN_MAX_LENGTH..=MAX_MAX_LENGTH).contains(n))
}

async fn run_extraction(
    state: &AppState,
    source: ImageSource,
    options: ExtractOptions,
) -> ApiResponse<OcrResponse> {
    let debug = state.config.server.debug;
    let timeout_secs = state.config.server.request_timeout_secs;

    let result = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        state.extraction.extract(source, options),
    )
    .await;

    match result {
        Ok(Ok(extraction)) => ApiResponse::success(OcrResponse::from(extraction)),
        Ok(Err(e)) => ApiResponse::from_error(e, debug),
        Err(_) => ApiResponse::from_error(
            LipiError::Timeout(format!("Request timed out after {timeout_secs} seconds")),
            debug,
        ),
    }
}

/// `POST /api/ocr/extract`
///
/// Multipart upload. The image goes in the `image` part (`file` is accepted
/// as well); `preprocess` and `max_length` are optional text parts.
#[utoipa::path(
    post,
    path = "/api/ocr/extract",
    tag = "ocr",
    request_body(content_type = "multipart/form-data", content = String, description = "`image` file part with optional `preprocess` and `max_length` text parts"),
    responses(
        (status = 200, description = "Text extracted", body = OcrResponse),
        (status = 400, description = "Invalid request or image", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image format", body = ErrorResponse),
        (status = 502, description = "OCR provider error", body = ErrorResponse),
        (status = 503, description = "No OCR backend available", body = ErrorResponse),
        (status = 504, description = "OCR provider timed out", body = ErrorResponse),
    )
)]
pub async fn extract_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResponse<OcrResponse> {
    let debug = state.config.server.debug;
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => return ApiResponse::from_error(rejection.into(), debug),
    };

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut file_content_type: Option<String> = None;
    let mut options = ExtractOptions::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return ApiResponse::from_error(
                    multipart_error(e, state.config.image.max_image_size),
                    debug,
                );
            }
        };

        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "file" => {
                file_name = field.file_name().map(str::to_string);
                file_content_type = field.content_type().map(str::to_string);

                match field.bytes().await {
                    Ok(b) => file_bytes = Some(b.to_vec()),
                    Err(e) => {
                        return ApiResponse::from_error(
                            multipart_error(e, state.config.image.max_image_size),
                            debug,
                        );
                    }
                }
            }
            "preprocess" => {
                let raw = field.text().await.unwrap_or_default();
                match parse_form_bool(&raw) {
                    Some(value) => options.preprocess = value,
                    None => {
                        return ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            "preprocess must be one of true/false/1/0/yes/no",
                        );
                    }
                }
            }
            "max_length" => {
                let raw = field.text().await.unwrap_or_default();
                match parse_max_length(&raw) {
                    Some(value) => options.max_length = value,
                    None => {
                        return ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            format!(
                                "max_length must be between {MIN_MAX_LENGTH} and {MAX_MAX_LENGTH}"
                            ),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let Some(bytes) = file_bytes else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing required 'image' field");
    };

    let source = ImageSource::Upload {
        bytes,
        file_name,
        content_type: file_content_type,
    };
    run_extraction(&state, source, options).await
}

/// `POST /api/ocr/extract-url`
#[utoipa::path(
    post,
    path = "/api/ocr/extract-url",
    tag = "ocr",
    request_body = ExtractUrlRequest,
    responses(
        (status = 200, description = "Text extracted", body = OcrResponse),
        (status = 400, description = "Invalid request, URL or download failure", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 502, description = "OCR provider error", body = ErrorResponse),
        (status = 503, description = "No OCR backend available", body = ErrorResponse),
        (status = 504, description = "OCR provider timed out", body = ErrorResponse),
    )
)]
pub async fn extract_url(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExtractUrlRequest>,
) -> ApiResponse<OcrResponse> {
    if let Err(errors) = req.validate() {
        return ApiResponse::from_error(errors.into(), state.config.server.debug);
    }

    let options = req.options();
    run_extraction(&state, ImageSource::Url(req.image_url), options).await
}

/// `POST /api/ocr/extract-base64`
#[utoipa::path(
    post,
    path = "/api/ocr/extract-base64",
    tag = "ocr",
    request_body = ExtractBase64Request,
    responses(
        (status = 200, description = "Text extracted", body = OcrResponse),
        (status = 400, description = "Invalid request or base64 data", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 502, description = "OCR provider error", body = ErrorResponse),
        (status = 503, description = "No OCR backend available", body = ErrorResponse),
        (status = 504, description = "OCR provider timed out", body = ErrorResponse),
    )
)]
pub async fn extract_base64(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExtractBase64Request>,
) -> ApiResponse<OcrResponse> {
    if let Err(errors) = req.validate() {
        return ApiResponse::from_error(errors.into(), state.config.server.debug);
    }

    let options = req.options();
    run_extraction(&state, ImageSource::Base64(req.image_base64), options).await
}

/// `GET /api/ocr/model-info`
#[utoipa::path(
    get,
    path = "/api/ocr/model-info",
    tag = "ocr",
    responses(
        (status = 200, description = "Active OCR backend", body = ModelInfoResponse),
    )
)]
pub async fn model_info(State(state): State<AppState>) -> ApiResponse<ModelInfoResponse> {
    ApiResponse::success(state.extraction.provider().info().into())
}
