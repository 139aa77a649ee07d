use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use validator::ValidationErrors;

use crate::error::LipiError;

/// `axum::Json` whose rejections come back in the service's error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(LipiError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for LipiError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<MultipartRejection> for LipiError {
    fn from(rejection: MultipartRejection) -> Self {
        LipiError::Validation(format!("Invalid multipart request: {}", rejection.body_text()))
    }
}

impl From<ValidationErrors> for LipiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {field}"),
                })
            })
            .collect();
        messages.sort();
        LipiError::Validation(messages.join("; "))
    }
}

fn map_json_rejection(rejection: JsonRejection) -> LipiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                LipiError::Validation(format!("Missing required field: {field}"))
            } else {
                LipiError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            LipiError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            LipiError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(err) => {
            if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                LipiError::PayloadTooLarge("Request body too large".to_string())
            } else {
                LipiError::Validation("Failed to read request body".to_string())
            }
        }
        _ => LipiError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
