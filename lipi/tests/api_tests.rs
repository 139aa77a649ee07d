mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lipi::api::body_limit;
use lipi::config::ImageConfig;

use common::{get, post_json, post_multipart, send, Part, HF_MODEL};

async fn mock_hf(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{HF_MODEL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": text}])))
        .mount(&server)
        .await;
    server
}

fn assert_error(json: &serde_json::Value, code: &str) {
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], code);
    assert!(json["detail"].is_string(), "detail should be a string: {json}");
    assert!(json.get("text").is_none());
}

// ---------------------------------------------------------------------------
// System endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_lists_endpoints() {
    let server = mock_hf("").await;
    let (status, json) = send(common::app(common::hf_config(&server.uri())), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "running");
    assert_eq!(json["model"], HF_MODEL);
    assert_eq!(json["endpoints"]["extract_base64"], "/api/ocr/extract-base64");
}

#[tokio::test]
async fn health_is_healthy_with_backend() {
    let server = mock_hf("").await;
    let (status, json) = send(common::app(common::hf_config(&server.uri())), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["backend"], "huggingface");
}

#[tokio::test]
async fn health_is_degraded_without_backend() {
    let (status, json) = send(common::app(common::unavailable_config()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn model_info_describes_backend() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        get("/api/ocr/model-info"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model_name"], HF_MODEL);
    assert_eq!(json["backend"], "huggingface");
    assert_eq!(json["is_loaded"], true);
    assert_eq!(json["device"], "remote");
    assert!(json.get("reason").is_none());
}

#[tokio::test]
async fn model_info_explains_unavailability() {
    let (_, json) = send(
        common::app(common::unavailable_config()),
        get("/api/ocr/model-info"),
    )
    .await;

    assert_eq!(json["is_loaded"], false);
    assert_eq!(json["backend"], "unavailable");
    assert!(json["reason"].as_str().unwrap().contains("API key required"));
}

#[tokio::test]
async fn openapi_json_is_valid() {
    let (status, json) = send(common::app(common::unavailable_config()), get("/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    let version = json["openapi"].as_str().expect("openapi field");
    assert!(version.starts_with('3'), "got {version}");
    assert!(json["paths"].get("/api/ocr/extract-url").is_some());
}

// ---------------------------------------------------------------------------
// Base64
// ---------------------------------------------------------------------------

#[tokio::test]
async fn base64_extraction_returns_fixed_shape() {
    let server = mock_hf(" नमस्ते ").await;
    let png = common::sample_png(120, 40);

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode(&png)}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "नमस्ते");
    assert_eq!(json["confidence"], 0.0);
    assert!(json["processing_time"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        json["image_info"],
        json!({"width": 120, "height": 40, "mode": "RGB", "format": "PNG"})
    );
    assert_eq!(json["device"], "remote");
    assert_eq!(json["model"], HF_MODEL);
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn base64_data_url_is_accepted() {
    let server = mock_hf("कमल").await;
    let jpeg = common::encode(&common::sample_image(64, 64), ImageFormat::Jpeg);
    let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg));

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": data_url, "preprocess": false}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["image_info"]["format"], "JPEG");
}

#[tokio::test]
async fn invalid_base64_is_bad_request() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json("/api/ocr/extract-base64", json!({"image_base64": "%%%not-base64%%%"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&json, "invalid_request");
    assert_eq!(json["detail"], "Invalid base64 image data");
}

#[tokio::test]
async fn base64_of_non_image_is_bad_request() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode("just some text")}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&json, "invalid_request");
}

#[tokio::test]
async fn max_length_out_of_range_is_bad_request() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": "AAAA", "max_length": 5000}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&json, "invalid_request");
    assert!(json["detail"].as_str().unwrap().contains("max_length"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = mock_hf("").await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/ocr/extract-base64")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, json) = send(common::app(common::hf_config(&server.uri())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&json, "invalid_request");
}

#[tokio::test]
async fn missing_field_is_named() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json("/api/ocr/extract-base64", json!({"preprocess": true})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Missing required field: image_base64");
}

#[tokio::test]
async fn oversized_image_is_payload_too_large() {
    let server = mock_hf("").await;
    let mut config = common::hf_config(&server.uri());
    config.image = ImageConfig {
        max_image_size: 256,
        ..ImageConfig::default()
    };
    let png = common::noisy_png(16, 16);
    assert!(png.len() > 256);

    let (status, json) = send(
        common::app(config),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode(&png)}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_error(&json, "payload_too_large");
}

#[tokio::test]
async fn body_over_limit_keeps_error_envelope() {
    let server = mock_hf("").await;
    let mut config = common::hf_config(&server.uri());
    config.image = ImageConfig {
        max_image_size: 1024,
        ..ImageConfig::default()
    };
    let limit = body_limit(1024);
    let body = json!({"image_base64": "A".repeat(limit + 10)}).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/ocr/extract-base64")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(common::app(config), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_error(&json, "payload_too_large");
}

#[tokio::test]
async fn tiny_image_is_bad_request() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode(common::sample_png(2, 2))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().contains("too small"));
}

// ---------------------------------------------------------------------------
// Provider failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unavailable_backend_is_service_unavailable() {
    let (status, json) = send(
        common::app(common::unavailable_config()),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode(common::sample_png(64, 64))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_error(&json, "service_unavailable");
}

#[tokio::test]
async fn provider_error_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{HF_MODEL}")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "bad input"})))
        .mount(&server)
        .await;

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-base64",
            json!({"image_base64": STANDARD.encode(common::sample_png(64, 64))}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_error(&json, "upstream_error");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));
}

// ---------------------------------------------------------------------------
// URL
// ---------------------------------------------------------------------------

#[tokio::test]
async fn url_extraction_downloads_image() {
    let server = mock_hf("सूरज").await;
    Mock::given(method("GET"))
        .and(path("/scan.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(common::sample_png(300, 100)),
        )
        .mount(&server)
        .await;

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-url",
            json!({"image_url": format!("{}/scan.png", server.uri()), "max_length": 128}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["text"], "सूरज");
    assert_eq!(json["image_info"]["width"], 300);
}

#[tokio::test]
async fn url_download_failure_reports_status() {
    let server = mock_hf("").await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json(
            "/api/ocr/extract-url",
            json!({"image_url": format!("{}/missing.png", server.uri())}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Failed to download image: HTTP 404");
}

#[tokio::test]
async fn non_http_url_is_rejected() {
    let server = mock_hf("").await;
    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_json("/api/ocr/extract-url", json!({"image_url": "ftp://example.com/a.png"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "URL must start with http:// or https://");
}

// ---------------------------------------------------------------------------
// Multipart upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn multipart_upload_extracts_text() {
    let server = mock_hf("गंगा").await;
    let png = common::sample_png(80, 80);

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_multipart(
            "/api/ocr/extract",
            &[
                Part::File {
                    name: "image",
                    file_name: "scan.png",
                    content_type: "image/png",
                    bytes: &png,
                },
                Part::Text {
                    name: "preprocess",
                    value: "false",
                },
                Part::Text {
                    name: "max_length",
                    value: "256",
                },
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["text"], "गंगा");
    assert_eq!(json["image_info"]["mode"], "RGB");
}

#[tokio::test]
async fn multipart_accepts_file_field_name() {
    let server = mock_hf("जल").await;
    let jpeg = common::encode(&common::sample_image(64, 64), ImageFormat::Jpeg);

    let (status, _) = send(
        common::app(common::hf_config(&server.uri())),
        post_multipart(
            "/api/ocr/extract",
            &[Part::File {
                name: "file",
                file_name: "scan.jpg",
                content_type: "image/jpeg",
                bytes: &jpeg,
            }],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn multipart_unsupported_type_is_415() {
    let server = mock_hf("").await;

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_multipart(
            "/api/ocr/extract",
            &[Part::File {
                name: "image",
                file_name: "anim.gif",
                content_type: "image/gif",
                bytes: b"GIF89a....",
            }],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_error(&json, "unsupported_media_type");
}

#[tokio::test]
async fn multipart_without_image_is_bad_request() {
    let server = mock_hf("").await;

    let (status, json) = send(
        common::app(common::hf_config(&server.uri())),
        post_multipart(
            "/api/ocr/extract",
            &[Part::Text {
                name: "preprocess",
                value: "true",
            }],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Missing required 'image' field");
}

#[tokio::test]
async fn multipart_bad_flag_is_bad_request() {
    let server = mock_hf("").await;
    let png = common::sample_png(64, 64);

    let (status, _) = send(
        common::app(common::hf_config(&server.uri())),
        post_multipart(
            "/api/ocr/extract",
            &[
                Part::File {
                    name: "image",
                    file_name: "scan.png",
                    content_type: "image/png",
                    bytes: &png,
                },
                Part::Text {
                    name: "max_length",
                    value: "9",
                },
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn multipart_body_over_limit_is_payload_too_large() {
    let server = mock_hf("").await;
    let mut config = common::hf_config(&server.uri());
    config.image = ImageConfig {
        max_image_size: 1024,
        ..ImageConfig::default()
    };
    let bytes = vec![0u8; body_limit(1024) + 10];

    let (status, json) = send(
        common::app(config),
        post_multipart(
            "/api/ocr/extract",
            &[Part::File {
                name: "image",
                file_name: "scan.png",
                content_type: "image/png",
                bytes: &bytes,
            }],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_error(&json, "payload_too_large");
}
