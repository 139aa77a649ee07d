#[cfg(feature = "tesseract")]
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tesseract")]
use leptess::LepTess;
use serde::Serialize;
#[cfg(feature = "tesseract")]
use tokio::sync::Mutex;
use tracing::{info, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{parse_provider_model, OcrConfig};
use crate::error::{LipiError, Result};
use crate::models::OcrOutput;

use super::api::{HuggingFaceClient, VisionChatClient};

#[derive(Clone)]
enum OcrApiClient {
    HuggingFace(HuggingFaceClient),
    Vision {
        provider: &'static str,
        client: VisionChatClient,
    },
}

impl OcrApiClient {
    async fn ocr(&self, image_bytes: &[u8], max_length: usize) -> Result<OcrOutput> {
        match self {
            OcrApiClient::HuggingFace(c) => c.ocr(image_bytes, max_length).await,
            OcrApiClient::Vision { client, .. } => client.ocr(image_bytes, max_length).await,
        }
    }
}

#[derive(Clone)]
enum OcrBackend {
    #[cfg(feature = "tesseract")]
    Local { tesseract: Arc<Mutex<LepTess>> },
    Api { client: OcrApiClient },
    Unavailable { reason: String },
}

/// What `/api/ocr/model-info` reports about the active backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub backend: String,
    pub is_loaded: bool,
    pub device: String,
    pub languages: Option<String>,
    pub reason: Option<String>,
}

/// Front door to whichever OCR engine the configuration selects.
///
/// Construction never fails because a backend is missing: the provider
/// degrades to an unavailable state and every call reports why.
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
    model_name: String,
    config: OcrConfig,
}

#[cfg(feature = "tesseract")]
fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let (provider, model) = parse_provider_model(&config.model);
        let provider = provider.to_lowercase();

        let backend = match provider.as_str() {
            "openai" | "openrouter" => {
                let provider: &'static str = if provider == "openrouter" {
                    "openrouter"
                } else {
                    "openai"
                };
                match VisionChatClient::new(config, provider, model) {
                    Ok(client) => {
                        info!(provider, model, "Vision chat OCR backend initialized");
                        OcrBackend::Api {
                            client: OcrApiClient::Vision { provider, client },
                        }
                    }
                    Err(e) => {
                        let reason = format!("{provider} OCR backend unavailable: {e}");
                        warn!("{}", reason);
                        OcrBackend::Unavailable { reason }
                    }
                }
            }
            "local" => Self::local_backend(config),
            _ => match HuggingFaceClient::new(config, model) {
                Ok(client) => {
                    info!(
                        model,
                        authenticated = config.api_key.is_some(),
                        "Hugging Face inference backend initialized"
                    );
                    OcrBackend::Api {
                        client: OcrApiClient::HuggingFace(client),
                    }
                }
                Err(e) => {
                    let reason = format!("Hugging Face backend unavailable: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
        };

        Ok(Self {
            backend,
            model_name: model.to_string(),
            config: config.clone(),
        })
    }

    #[cfg(feature = "tesseract")]
    fn local_backend(config: &OcrConfig) -> OcrBackend {
        match create_tesseract(&config.languages) {
            Ok(lt) => {
                info!(languages = %config.languages, "Tesseract OCR initialized");
                OcrBackend::Local {
                    tesseract: Arc::new(Mutex::new(lt)),
                }
            }
            Err(e) => {
                let reason = format!("Tesseract not available: {e}");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        }
    }

    #[cfg(not(feature = "tesseract"))]
    fn local_backend(_config: &OcrConfig) -> OcrBackend {
        let reason =
            "Local OCR requested but this build lacks the `tesseract` feature".to_string();
        warn!("{}", reason);
        OcrBackend::Unavailable { reason }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            #[cfg(feature = "tesseract")]
            OcrBackend::Local { .. } => "tesseract",
            OcrBackend::Api {
                client: OcrApiClient::HuggingFace(_),
            } => "huggingface",
            OcrBackend::Api {
                client: OcrApiClient::Vision { provider, .. },
            } => *provider,
            OcrBackend::Unavailable { .. } => "unavailable",
        }
    }

    /// Where inference runs: `cpu` in-process, `remote` for hosted APIs.
    pub fn device(&self) -> &'static str {
        match &self.backend {
            #[cfg(feature = "tesseract")]
            OcrBackend::Local { .. } => "cpu",
            OcrBackend::Api { .. } => "remote",
            OcrBackend::Unavailable { .. } => "none",
        }
    }

    pub fn info(&self) -> ModelInfo {
        let (languages, reason) = match &self.backend {
            #[cfg(feature = "tesseract")]
            OcrBackend::Local { .. } => (Some(self.config.languages.clone()), None),
            OcrBackend::Api { .. } => (None, None),
            OcrBackend::Unavailable { reason } => (None, Some(reason.clone())),
        };

        ModelInfo {
            model_name: self.model_name.clone(),
            backend: self.backend_name().to_string(),
            is_loaded: self.is_available(),
            device: self.device().to_string(),
            languages,
            reason,
        }
    }

    /// Run OCR on an encoded image.
    ///
    /// The returned text is trimmed and cut to at most `max_length`
    /// grapheme clusters.
    pub async fn ocr(&self, image_bytes: &[u8], max_length: usize) -> Result<OcrOutput> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        let result = tokio::time::timeout(
            timeout_duration,
            self.ocr_internal(image_bytes, max_length),
        )
        .await;

        let output = match result {
            Ok(inner_result) => inner_result?,
            Err(_) => {
                return Err(LipiError::Timeout(format!(
                    "OCR operation timed out after {} seconds",
                    self.config.timeout_secs
                )))
            }
        };

        Ok(OcrOutput {
            text: truncate_graphemes(output.text.trim(), max_length),
            confidence: output.confidence,
        })
    }

    async fn ocr_internal(&self, image_bytes: &[u8], max_length: usize) -> Result<OcrOutput> {
        match &self.backend {
            #[cfg(feature = "tesseract")]
            OcrBackend::Local { tesseract } => {
                let bytes = image_bytes.to_vec();
                let tesseract = Arc::clone(tesseract);

                tokio::task::spawn_blocking(move || {
                    let mut lt = tesseract.blocking_lock();
                    lt.set_image_from_mem(&bytes)
                        .map_err(|e| LipiError::Ocr(format!("Failed to set image: {e}")))?;
                    let text = lt
                        .get_utf8_text()
                        .map_err(|e| LipiError::Ocr(format!("Failed to extract text: {e}")))?;
                    let confidence = lt.mean_text_conf() as f32 / 100.0;
                    Ok(OcrOutput {
                        text,
                        confidence: Some(confidence),
                    })
                })
                .await
                .map_err(|e| LipiError::Internal(format!("OCR task panicked: {e}")))?
            }
            OcrBackend::Api { client } => client.ocr(image_bytes, max_length).await,
            OcrBackend::Unavailable { reason } => Err(LipiError::OcrUnavailable(reason.clone())),
        }
    }
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect::<String>().trim_end().to_string()
}
