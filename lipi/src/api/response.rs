//! # Response Envelope & Error Contract
//!
//! Every endpoint answers with an [`ApiResponse<T>`]. The payload is
//! flattened next to a `success` flag so the wire shape stays flat:
//!
//! ```json
//! { "success": true, "text": "नमस्ते", "confidence": 0.0, "processing_time": 0.42, ... }
//! ```
//!
//! ```json
//! { "success": false, "error": "invalid_request", "detail": "URL must start with http:// or https://" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::LipiError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request, failed validation, undecodable image or a source
    /// URL that could not be downloaded. HTTP 400.
    InvalidRequest,
    /// Image exceeds the configured byte limit. HTTP 413.
    PayloadTooLarge,
    /// Uploaded content type is not an accepted image format. HTTP 415.
    UnsupportedMediaType,
    /// The OCR provider answered with an error. HTTP 502.
    UpstreamError,
    /// No OCR backend is configured or reachable. HTTP 503.
    ServiceUnavailable,
    /// The OCR provider or the request as a whole ran out of time. HTTP 504.
    GatewayTimeout,
    /// Unexpected server-side failure. HTTP 500.
    InternalError,
}

impl ErrorCode {
    /// Returns the HTTP status code corresponding to this error code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::UnsupportedMediaType => write!(f, "unsupported_media_type"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::GatewayTimeout => write!(f, "gateway_timeout"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Error body as documented in the OpenAPI schema.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    pub error: ErrorCode,
    /// Human-readable description safe to show to end users.
    pub detail: Option<String>,
}

/// Canonical response envelope.
///
/// On success the payload's fields sit beside `success: true`. On error,
/// `error` and `detail` are present and no payload fields are emitted.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            detail: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(code),
            detail: Some(detail.into()),
            status: code.status(),
        }
    }

    /// Convert a [`LipiError`], optionally exposing internal details.
    ///
    /// Internal failures are always logged; the client only sees the
    /// real message when `debug` is on.
    pub fn from_error(err: LipiError, debug: bool) -> Self {
        let code = err.code();
        if code == ErrorCode::InternalError {
            tracing::error!(error = %err, "Internal error mapped to response");
        } else if code.status().is_server_error() {
            tracing::warn!(error = %err, code = %code, "Request failed upstream");
        }
        ApiResponse::error(code, err.public_message(debug))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "success": false,
                    "error": "internal_error",
                    "detail": "An internal error occurred"
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<LipiError> for ApiResponse<T> {
    fn from(err: LipiError) -> Self {
        ApiResponse::from_error(err, false)
    }
}
