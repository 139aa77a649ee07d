#![allow(dead_code)]

use std::io::Cursor;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tower::ServiceExt;

use lipi::api::{create_router, AppState};
use lipi::config::{Config, ImageConfig, OcrConfig, ServerConfig};
use lipi::ocr::OcrProvider;

pub const HF_MODEL: &str = "owner/hindi-trocr";

/// A small RGB image with a dark stroke across a light background.
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if y == height / 2 {
            Rgb([20, 20, 20])
        } else {
            Rgb([235, 235, 235])
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Pseudo-random pixels, so the encoded PNG does not compress away.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)).wrapping_mul(2_654_435_761);
        Rgb([(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8])
    });
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format)
        .expect("encode test image");
    out
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    encode(&sample_image(width, height), ImageFormat::Png)
}

/// Config pointing the Hugging Face backend at a mock server.
pub fn hf_config(mock_uri: &str) -> Config {
    Config {
        server: ServerConfig::default(),
        ocr: OcrConfig {
            model: format!("huggingface/{HF_MODEL}"),
            api_key: None,
            base_url: Some(format!("{mock_uri}/models")),
            timeout_secs: 5,
            max_retries: 2,
            ..OcrConfig::default()
        },
        image: ImageConfig::default(),
    }
}

/// Config whose OCR backend cannot be constructed.
pub fn unavailable_config() -> Config {
    Config {
        server: ServerConfig::default(),
        ocr: OcrConfig {
            model: "openai/gpt-4o".to_string(),
            api_key: None,
            ..OcrConfig::default()
        },
        image: ImageConfig::default(),
    }
}

pub fn app(config: Config) -> Router {
    let ocr = OcrProvider::new(&config.ocr).expect("provider");
    create_router(AppState::new(config, ocr).expect("state"))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub const BOUNDARY: &str = "lipi-test-boundary";

pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}
