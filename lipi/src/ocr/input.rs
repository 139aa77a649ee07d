//! Turning the three accepted input shapes into raw image bytes.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::ImageConfig;
use crate::error::{LipiError, Result};

/// Decode a base64 image, accepting both raw base64 and data URLs.
///
/// Everything up to and including the first `,` is treated as a data-URL
/// header. Whitespace and trailing padding are ignored.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>> {
    let body = match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    };

    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.trim_end_matches('=');
    if cleaned.is_empty() {
        return Err(LipiError::InvalidImage(
            "Invalid base64 image data".to_string(),
        ));
    }

    STANDARD_NO_PAD
        .decode(cleaned)
        .map_err(|_| LipiError::InvalidImage("Invalid base64 image data".to_string()))
}

pub fn validate_image_url(raw: &str) -> Result<Url> {
    let invalid = || LipiError::Validation("URL must start with http:// or https://".to_string());

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(invalid()),
    }
}

pub fn check_size(len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(LipiError::PayloadTooLarge(format!(
            "File too large. Maximum size: {}MB",
            max / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Check a multipart upload against the accepted MIME types.
///
/// A declared content type wins. Without one, the type is guessed from the
/// file name and then from the leading magic bytes.
pub fn check_content_type(
    content_type: Option<&str>,
    file_name: Option<&str>,
    bytes: &[u8],
    supported: &[String],
) -> Result<()> {
    let declared = content_type
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or(ct)
                .trim()
                .to_lowercase()
        })
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    let detected = declared
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
        })
        .or_else(|| infer::get(bytes).map(|kind| kind.mime_type().to_string()));

    match detected {
        Some(mime) if supported.iter().any(|s| s.eq_ignore_ascii_case(&mime)) => Ok(()),
        _ => Err(LipiError::UnsupportedMediaType(format!(
            "Unsupported file format. Supported: {}",
            supported.join(", ")
        ))),
    }
}

/// Downloads images referenced by URL.
#[derive(Clone, Debug)]
pub struct ImageFetcher {
    client: Client,
    max_image_size: usize,
}

impl ImageFetcher {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .user_agent(concat!("lipi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LipiError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_image_size: config.max_image_size,
        })
    }

    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(url = %url, "Downloading image");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LipiError::Download(format!("Failed to download image: {e}")))?;

        if resp.status() != StatusCode::OK {
            return Err(LipiError::Download(format!(
                "Failed to download image: HTTP {}",
                resp.status().as_u16()
            )));
        }

        if let Some(len) = resp.content_length() {
            check_size(len as usize, self.max_image_size)?;
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LipiError::Download(format!("Failed to download image: {e}")))?;
        check_size(bytes.len(), self.max_image_size)?;

        Ok(bytes.to_vec())
    }
}
