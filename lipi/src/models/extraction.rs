use serde::{Deserialize, Serialize};

use super::ImageInfo;

pub const DEFAULT_MAX_LENGTH: usize = 512;
pub const MIN_MAX_LENGTH: usize = 64;
pub const MAX_MAX_LENGTH: usize = 1024;

/// Per-request knobs for the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Apply grayscale, denoise and contrast stretching before OCR.
    pub preprocess: bool,
    /// Upper bound on the returned text, in grapheme clusters.
    pub max_length: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preprocess: true,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Raw result of one OCR backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    /// Backend-reported confidence in `[0, 1]`, when it has one.
    pub confidence: Option<f32>,
}

/// Final result of the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub confidence: f32,
    /// Seconds, rounded to two decimals.
    pub processing_time: f64,
    pub image_info: ImageInfo,
    pub device: String,
    pub model: String,
}
