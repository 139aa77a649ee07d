//! Lipi: a small HTTP service that extracts Hindi text from images.
//!
//! Images arrive as multipart uploads, URLs or base64 strings, are
//! normalized in-process and handed to an OCR backend (Hugging Face
//! Inference API, an OpenAI-compatible vision model, or local Tesseract).

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ocr;
pub mod services;
