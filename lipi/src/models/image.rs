use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

/// Where the bytes of an image come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Multipart upload, with whatever the client declared about it.
    Upload {
        bytes: Vec<u8>,
        file_name: Option<String>,
        content_type: Option<String>,
    },
    /// Publicly reachable `http(s)` URL, downloaded by the service.
    Url(String),
    /// Raw base64 or a `data:image/...;base64,` URL.
    Base64(String),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Upload { .. } => "upload",
            ImageSource::Url(_) => "url",
            ImageSource::Base64(_) => "base64",
        }
    }
}

/// Metadata of an image as it was received, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Pixel layout in the conventional short form (`RGB`, `RGBA`, `L`, ...).
    pub mode: String,
    /// Container format (`PNG`, `JPEG`, ...) or `Unknown`.
    pub format: String,
}

impl ImageInfo {
    pub fn from_image(img: &DynamicImage, format: Option<ImageFormat>) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            mode: color_mode(img.color()).to_string(),
            format: format
                .map(format_name)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGBF",
        ColorType::Rgba32F => "RGBAF",
        _ => "Unknown",
    }
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| match *ext {
            "jpg" => "JPEG".to_string(),
            "tif" => "TIFF".to_string(),
            other => other.to_uppercase(),
        })
        .unwrap_or_else(|| "Unknown".to_string())
}
