use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{LipiError, Result};
use crate::models::OcrOutput;

pub const HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Upper bound on how long we wait for a cold Hugging Face model.
const MAX_MODEL_LOADING_WAIT: Duration = Duration::from_secs(10);

const TRANSCRIBE_PROMPT: &str = "Transcribe all handwritten or printed Hindi (Devanagari) text in this image. \
Return only the transcribed text, preserving line breaks, without translation or commentary.";

fn backoff(retries: u32) -> Duration {
    Duration::from_millis(100 * 2_u64.pow(retries))
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LipiError::Internal(format!("Failed to create HTTP client: {e}")))
}

fn transport_error(e: reqwest::Error, retries: u32) -> LipiError {
    if e.is_timeout() {
        LipiError::Timeout("OCR provider did not respond in time".to_string())
    } else {
        LipiError::Ocr(format!("API request failed after {retries} retries: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Hugging Face Inference API
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model_id: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: usize,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct HfGenerated {
    generated_text: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfResponse {
    Many(Vec<HfGenerated>),
    One(HfGenerated),
}

#[derive(Debug, Deserialize)]
struct HfError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    estimated_time: Option<f64>,
}

impl HuggingFaceClient {
    pub fn new(config: &OcrConfig, model_id: &str) -> Result<Self> {
        if model_id.trim().is_empty() {
            return Err(LipiError::Ocr(
                "Hugging Face model id must not be empty".to_string(),
            ));
        }

        let base = config
            .base_url
            .as_deref()
            .unwrap_or(HUGGINGFACE_BASE_URL)
            .trim_end_matches('/');
        let endpoint = if base.ends_with(model_id) {
            base.to_string()
        } else {
            format!("{base}/{model_id}")
        };

        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            api_key: config.api_key.clone(),
            endpoint,
            model_id: model_id.to_string(),
            max_retries: config.max_retries.max(1),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn ocr(&self, image_bytes: &[u8], max_length: usize) -> Result<OcrOutput> {
        let request = HfRequest {
            inputs: STANDARD.encode(image_bytes),
            parameters: HfParameters {
                max_new_tokens: max_length,
            },
            options: HfOptions {
                wait_for_model: false,
            },
        };

        let mut retries = 0;

        loop {
            let mut builder = self.client.post(&self.endpoint).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let resp = match builder.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    retries += 1;
                    if e.is_timeout() || retries >= self.max_retries {
                        return Err(transport_error(e, self.max_retries));
                    }
                    tokio::time::sleep(backoff(retries)).await;
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                let parsed: HfResponse = resp.json().await.map_err(|e| {
                    LipiError::Ocr(format!("Failed to parse model response: {e}"))
                })?;
                let first = match parsed {
                    HfResponse::Many(items) => items.into_iter().next(),
                    HfResponse::One(item) => Some(item),
                };
                return first
                    .map(|g| OcrOutput {
                        text: g.generated_text,
                        confidence: g.score,
                    })
                    .ok_or_else(|| LipiError::Ocr("No text returned by model".to_string()));
            }

            let body = resp.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(LipiError::Ocr(format!(
                    "Hugging Face authentication failed (HTTP {}); check HUGGINGFACE_API_KEY",
                    status.as_u16()
                )));
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                retries += 1;
                if retries >= self.max_retries {
                    return Err(LipiError::Ocr(format!(
                        "API request failed after {} retries: {status}",
                        self.max_retries
                    )));
                }

                let loading = serde_json::from_str::<HfError>(&body)
                    .ok()
                    .and_then(|e| e.estimated_time);
                let delay = match loading {
                    Some(secs) if status == StatusCode::SERVICE_UNAVAILABLE => {
                        let wait = Duration::try_from_secs_f64(secs)
                            .unwrap_or(MAX_MODEL_LOADING_WAIT)
                            .min(MAX_MODEL_LOADING_WAIT);
                        tracing::info!(
                            model = %self.model_id,
                            wait_secs = wait.as_secs_f64(),
                            "Hugging Face model is loading, waiting before retry"
                        );
                        wait
                    }
                    _ => backoff(retries),
                };
                tokio::time::sleep(delay).await;
                continue;
            }

            let detail = serde_json::from_str::<HfError>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(body);
            return Err(LipiError::Ocr(format!(
                "API request failed: {status} - {detail}"
            )));
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat completions with image input
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct VisionChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl VisionChatClient {
    /// `provider` is `openai` or `openrouter`; it only picks the default
    /// base URL.
    pub fn new(config: &OcrConfig, provider: &str, model: &str) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LipiError::Ocr(format!("API key required for {provider} OCR")))?;

        let default_base = match provider {
            "openrouter" => OPENROUTER_BASE_URL,
            _ => OPENAI_BASE_URL,
        };
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            api_key,
            base_url,
            model: model.to_string(),
            max_retries: config.max_retries.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn ocr(&self, image_bytes: &[u8], max_length: usize) -> Result<OcrOutput> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(image_bytes));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: TRANSCRIBE_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: max_length as u32,
            temperature: 0.0,
        };

        let text = self.make_request(&request).await?;
        Ok(OcrOutput {
            text,
            confidence: None,
        })
    }

    async fn make_request(&self, request: &ChatRequest) -> Result<String> {
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    if resp.status().is_success() {
                        let chat_response: ChatResponse = resp.json().await.map_err(|e| {
                            LipiError::Ocr(format!("Failed to parse response: {e}"))
                        })?;

                        return chat_response
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .ok_or_else(|| LipiError::Ocr("No response from API".to_string()));
                    } else if resp.status() == StatusCode::TOO_MANY_REQUESTS
                        || resp.status().is_server_error()
                    {
                        retries += 1;
                        if retries >= self.max_retries {
                            return Err(LipiError::Ocr(format!(
                                "API request failed after {} retries: {}",
                                self.max_retries,
                                resp.status()
                            )));
                        }
                        tokio::time::sleep(backoff(retries)).await;
                    } else {
                        let status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        return Err(LipiError::Ocr(format!(
                            "API request failed: {status} - {body}"
                        )));
                    }
                }
                Err(e) => {
                    retries += 1;
                    if e.is_timeout() || retries >= self.max_retries {
                        return Err(transport_error(e, self.max_retries));
                    }
                    tokio::time::sleep(backoff(retries)).await;
                }
            }
        }
    }
}
