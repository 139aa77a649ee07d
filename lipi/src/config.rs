use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Boolean env var, case-insensitive, so `DEBUG=True` from existing `.env`
/// files still counts.
fn parse_env_bool(var: &str, default: bool) -> bool {
    let Ok(val) = env::var(var) else {
        return default;
    };
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" | "" => false,
        _ => {
            tracing::warn!("Invalid value '{}' for {}. Using default.", val, var);
            default
        }
    }
}

/// Non-empty string env var. Empty values count as unset so that
/// `HUGGINGFACE_API_KEY=` in a `.env` file does not send a blank bearer token.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub const DEFAULT_HF_MODEL: &str = "sabaridsnfuji/Hindi_Offline_Handwritten_OCR";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exposes internal error details in responses.
    pub debug: bool,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// `provider/model`, e.g. `huggingface/sabaridsnfuji/Hindi_Offline_Handwritten_OCR`,
    /// `openai/gpt-4o` or `local/tesseract`.
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Tesseract language codes, `+`-separated (`hin`, `hin+eng`).
    pub languages: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// Maximum accepted image size in bytes (after base64 decoding).
    pub max_image_size: usize,
    pub max_image_dimension: u32,
    pub min_image_dimension: u32,
    /// Accepted MIME types for multipart uploads.
    pub supported_formats: Vec<String>,
    pub download_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: format!("huggingface/{DEFAULT_HF_MODEL}"),
            api_key: None,
            base_url: None,
            languages: "hin".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_image_size: 10 * 1024 * 1024,
            max_image_dimension: 2048,
            min_image_dimension: 8,
            supported_formats: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/jpg".to_string(),
            ],
            download_timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let server_defaults = ServerConfig::default();
        let ocr_defaults = OcrConfig::default();
        let image_defaults = ImageConfig::default();

        let model = env_non_empty("OCR_MODEL").unwrap_or_else(|| {
            env_non_empty("HUGGINGFACE_MODEL")
                .map(|m| format!("huggingface/{m}"))
                .unwrap_or(ocr_defaults.model)
        });

        let min_image_dimension =
            parse_env_or("MIN_IMAGE_DIMENSION", image_defaults.min_image_dimension);
        let mut max_image_dimension =
            parse_env_or("MAX_IMAGE_DIMENSION", image_defaults.max_image_dimension);
        if max_image_dimension < min_image_dimension.max(1) {
            tracing::warn!(
                "MAX_IMAGE_DIMENSION {} is below MIN_IMAGE_DIMENSION {}. Using {}.",
                max_image_dimension,
                min_image_dimension,
                min_image_dimension.max(1)
            );
            max_image_dimension = min_image_dimension.max(1);
        }

        Self {
            server: ServerConfig {
                host: env_non_empty("HOST").unwrap_or(server_defaults.host),
                port: parse_env_or("PORT", server_defaults.port),
                debug: parse_env_bool("DEBUG", server_defaults.debug),
                allowed_origins: env_non_empty("ALLOWED_ORIGINS")
                    .map(|v| parse_list(&v))
                    .unwrap_or(server_defaults.allowed_origins),
                request_timeout_secs: parse_env_or(
                    "REQUEST_TIMEOUT",
                    server_defaults.request_timeout_secs,
                ),
            },
            ocr: OcrConfig {
                model,
                api_key: env_non_empty("OCR_API_KEY").or_else(|| env_non_empty("HUGGINGFACE_API_KEY")),
                base_url: env_non_empty("OCR_BASE_URL")
                    .or_else(|| env_non_empty("HUGGINGFACE_API_URL")),
                languages: env_non_empty("OCR_LANGUAGES").unwrap_or(ocr_defaults.languages),
                timeout_secs: parse_env_or("API_TIMEOUT", ocr_defaults.timeout_secs),
                max_retries: parse_env_or("OCR_MAX_RETRIES", ocr_defaults.max_retries),
            },
            image: ImageConfig {
                max_image_size: parse_env_or("MAX_IMAGE_SIZE", image_defaults.max_image_size),
                max_image_dimension,
                min_image_dimension,
                supported_formats: env_non_empty("SUPPORTED_FORMATS")
                    .map(|v| parse_list(&v.to_lowercase()))
                    .unwrap_or(image_defaults.supported_formats),
                download_timeout_secs: parse_env_or(
                    "DOWNLOAD_TIMEOUT",
                    image_defaults.download_timeout_secs,
                ),
            },
        }
    }
}

/// Known OCR providers addressed with a `provider/` prefix.
pub const KNOWN_OCR_PROVIDERS: &[&str] = &["huggingface", "hf", "openai", "openrouter", "local"];

/// Parse an OCR model name into a (provider, model) tuple.
///
/// Hugging Face model ids contain a slash themselves
/// (`owner/name`), so an unknown prefix means the whole string is a
/// Hugging Face model id.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_OCR_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("huggingface", model)
}
