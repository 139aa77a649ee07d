use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::response::{ApiResponse, ErrorCode};

#[derive(Error, Debug)]
pub enum LipiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LipiError {
    /// Wire-level classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LipiError::Validation(_)
            | LipiError::InvalidImage(_)
            | LipiError::Download(_)
            | LipiError::Json(_)
            | LipiError::UrlParse(_)
            | LipiError::Base64(_) => ErrorCode::InvalidRequest,
            LipiError::PayloadTooLarge(_) => ErrorCode::PayloadTooLarge,
            LipiError::UnsupportedMediaType(_) => ErrorCode::UnsupportedMediaType,
            LipiError::Ocr(_) | LipiError::Http(_) => ErrorCode::UpstreamError,
            LipiError::OcrUnavailable(_) => ErrorCode::ServiceUnavailable,
            LipiError::Timeout(_) => ErrorCode::GatewayTimeout,
            LipiError::Processing(_) | LipiError::Io(_) | LipiError::Internal(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Message safe to hand to a client. Internal failures are reduced to a
    /// generic sentence unless `expose_internal` is set (debug mode).
    pub fn public_message(&self, expose_internal: bool) -> String {
        match self {
            LipiError::Validation(msg)
            | LipiError::UnsupportedMediaType(msg)
            | LipiError::PayloadTooLarge(msg)
            | LipiError::InvalidImage(msg)
            | LipiError::Download(msg)
            | LipiError::OcrUnavailable(msg)
            | LipiError::Timeout(msg) => msg.clone(),
            LipiError::Json(e) => format!("Invalid JSON: {e}"),
            LipiError::UrlParse(e) => format!("Invalid URL: {e}"),
            LipiError::Base64(_) => "Invalid base64 image data".to_string(),
            LipiError::Ocr(msg) => format!("OCR processing failed: {msg}"),
            LipiError::Http(e) => format!("OCR processing failed: {e}"),
            LipiError::Processing(_) | LipiError::Io(_) | LipiError::Internal(_) => {
                if expose_internal {
                    self.to_string()
                } else {
                    "An unexpected error occurred".to_string()
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code().status()
    }
}

impl IntoResponse for LipiError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LipiError>;
