use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::ImageConfig;
use crate::error::{LipiError, Result};
use crate::models::{ExtractOptions, Extraction, ImageSource, MAX_MAX_LENGTH, MIN_MAX_LENGTH};
use crate::ocr::input::{check_content_type, check_size, decode_base64_payload, validate_image_url};
use crate::ocr::{preprocessing, ImageFetcher, OcrProvider};

/// Runs one image through resolve → validate → normalize → OCR.
#[derive(Clone)]
pub struct ExtractionService {
    provider: OcrProvider,
    fetcher: ImageFetcher,
    image_config: ImageConfig,
}

impl ExtractionService {
    pub fn new(provider: OcrProvider, image_config: &ImageConfig) -> Result<Self> {
        Ok(Self {
            provider,
            fetcher: ImageFetcher::new(image_config)?,
            image_config: image_config.clone(),
        })
    }

    pub fn provider(&self) -> &OcrProvider {
        &self.provider
    }

    pub async fn extract(&self, source: ImageSource, options: ExtractOptions) -> Result<Extraction> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("extract", %request_id, source = source.kind());
        self.run(source, options).instrument(span).await
    }

    async fn run(&self, source: ImageSource, options: ExtractOptions) -> Result<Extraction> {
        let started = Instant::now();

        if !(MIN_MAX_LENGTH..=MAX_MAX_LENGTH).contains(&options.max_length) {
            return Err(LipiError::Validation(format!(
                "max_length must be between {MIN_MAX_LENGTH} and {MAX_MAX_LENGTH}"
            )));
        }

        let bytes = self.resolve(source).await?;
        if bytes.is_empty() {
            return Err(LipiError::InvalidImage("Empty image data".to_string()));
        }
        check_size(bytes.len(), self.image_config.max_image_size)?;

        if !self.provider.is_available() {
            return Err(LipiError::OcrUnavailable(
                self.provider
                    .info()
                    .reason
                    .unwrap_or_else(|| "OCR model not loaded".to_string()),
            ));
        }

        let image_config = self.image_config.clone();
        let (png, image_info) = tokio::task::spawn_blocking(move || {
            preprocessing::prepare(&bytes, &options, &image_config)
        })
        .await
        .map_err(|e| LipiError::Internal(format!("Image preprocessing task failed: {e}")))??;

        let output = self.provider.ocr(&png, options.max_length).await?;

        let confidence = output
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let processing_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        tracing::info!(
            width = image_info.width,
            height = image_info.height,
            chars = output.text.chars().count(),
            confidence,
            processing_time,
            "OCR extraction complete"
        );

        Ok(Extraction {
            text: output.text,
            confidence,
            processing_time,
            image_info,
            device: self.provider.device().to_string(),
            model: self.provider.model_name().to_string(),
        })
    }

    async fn resolve(&self, source: ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::Upload {
                bytes,
                file_name,
                content_type,
            } => {
                check_size(bytes.len(), self.image_config.max_image_size)?;
                check_content_type(
                    content_type.as_deref(),
                    file_name.as_deref(),
                    &bytes,
                    &self.image_config.supported_formats,
                )?;
                Ok(bytes)
            }
            ImageSource::Url(raw) => {
                let url = validate_image_url(&raw)?;
                self.fetcher.fetch(&url).await
            }
            ImageSource::Base64(payload) => decode_base64_payload(&payload),
        }
    }
}
