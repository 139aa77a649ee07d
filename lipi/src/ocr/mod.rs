//! OCR (Optical Character Recognition) Module
//!
//! Everything between "some bytes claiming to be an image" and "Hindi
//! text". Recognition itself is delegated to an external engine; this
//! module only gets the image into shape and talks to that engine.
//!
//! # Architecture
//!
//! - `input` turns uploads, URLs and base64 strings into raw bytes
//! - `preprocessing` decodes, validates and normalizes the image
//! - `OcrProvider` picks a backend from `OcrConfig.model`:
//!   - `huggingface/<owner>/<model>` (or a bare model id): Hugging Face Inference API
//!   - `openai/<model>`, `openrouter/<model>`: OpenAI-compatible vision chat
//!   - `local/tesseract`: in-process Tesseract via leptess (`tesseract` feature)
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr)?;
//! let (png, info) = prepare(&bytes, &ExtractOptions::default(), &config.image)?;
//! let output = ocr.ocr(&png, 512).await?;
//! ```

mod api;
pub mod input;
pub mod preprocessing;
mod provider;

pub use api::{HuggingFaceClient, VisionChatClient, HUGGINGFACE_BASE_URL};
pub use input::ImageFetcher;
pub use preprocessing::prepare;
pub use provider::{ModelInfo, OcrProvider};
