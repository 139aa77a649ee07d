use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::ocr::OcrProvider;
use crate::services::ExtractionService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extraction: ExtractionService,
}

impl AppState {
    pub fn new(config: Config, ocr: OcrProvider) -> Result<Self> {
        let extraction = ExtractionService::new(ocr, &config.image)?;

        Ok(Self {
            config: Arc::new(config),
            extraction,
        })
    }
}
