//! OCR request/response DTOs.
//!
//! These types define the wire format of the `/api/ocr/*` endpoints. They
//! are kept apart from the domain types in `crate::models` so the JSON
//! contract can stay fixed while the pipeline evolves.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{self, ExtractOptions, DEFAULT_MAX_LENGTH};
use crate::ocr::ModelInfo;

fn default_preprocess() -> bool {
    true
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /api/ocr/extract-url`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct ExtractUrlRequest {
    /// Publicly reachable `http(s)` URL of the image.
    #[validate(length(min = 1, message = "image_url must not be empty"))]
    pub image_url: String,
    /// Apply grayscale, denoise and contrast stretching. Defaults to `true`.
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
    /// Maximum length of the returned text (64 to 1024). Defaults to 512.
    #[serde(default = "default_max_length")]
    #[validate(range(min = 64, max = 1024, message = "max_length must be between 64 and 1024"))]
    pub max_length: usize,
}

/// Request body for `POST /api/ocr/extract-base64`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct ExtractBase64Request {
    /// Base64 image data, optionally as a `data:image/...;base64,` URL.
    #[validate(length(min = 1, message = "image_base64 must not be empty"))]
    pub image_base64: String,
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
    #[serde(default = "default_max_length")]
    #[validate(range(min = 64, max = 1024, message = "max_length must be between 64 and 1024"))]
    pub max_length: usize,
}

impl ExtractUrlRequest {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            preprocess: self.preprocess,
            max_length: self.max_length,
        }
    }
}

impl ExtractBase64Request {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            preprocess: self.preprocess,
            max_length: self.max_length,
        }
    }
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Metadata of the submitted image, before any normalization.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageInfoResponse {
    pub width: u32,
    pub height: u32,
    /// Pixel layout, e.g. `RGB`, `RGBA`, `L`.
    pub mode: String,
    /// Container format, e.g. `PNG`, `JPEG`.
    pub format: String,
}

/// Successful extraction. Serialized next to `"success": true`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OcrResponse {
    /// Extracted Hindi text.
    pub text: String,
    /// Backend confidence in `[0, 1]`; `0.0` when the backend reports none.
    pub confidence: f32,
    /// Wall-clock seconds spent on the request, two decimals.
    pub processing_time: f64,
    pub image_info: ImageInfoResponse,
    /// `cpu` for the in-process engine, `remote` for hosted inference.
    pub device: String,
    pub model: String,
}

/// Response body for `GET /api/ocr/model-info`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModelInfoResponse {
    pub model_name: String,
    /// `huggingface`, `openai`, `openrouter`, `tesseract` or `unavailable`.
    pub backend: String,
    pub is_loaded: bool,
    pub device: String,
    /// Tesseract language packs in use (local backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    /// Why the backend is unavailable, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<models::ImageInfo> for ImageInfoResponse {
    fn from(info: models::ImageInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            mode: info.mode,
            format: info.format,
        }
    }
}

impl From<models::Extraction> for OcrResponse {
    fn from(extraction: models::Extraction) -> Self {
        Self {
            text: extraction.text,
            confidence: extraction.confidence,
            processing_time: extraction.processing_time,
            image_info: extraction.image_info.into(),
            device: extraction.device,
            model: extraction.model,
        }
    }
}

impl From<ModelInfo> for ModelInfoResponse {
    fn from(info: ModelInfo) -> Self {
        Self {
            model_name: info.model_name,
            backend: info.backend,
            is_loaded: info.is_loaded,
            device: info.device,
            languages: info.languages,
            reason: info.reason,
        }
    }
}
