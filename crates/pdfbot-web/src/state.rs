use anyhow::{Context, Result};
use pdfbot_core::{ApiConfig, PdfBundler};

/// Global application state.
///
/// Holds no per-request data: every request gets its own log and buffers.
pub struct AppState {
    pub bundler: PdfBundler,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let bundler = PdfBundler::new(config).context("Failed to create PDF bundler")?;

        Ok(Self { bundler })
    }

    /// State backed by a custom platform client
    #[cfg(test)]
    pub fn with_api(
        api: std::sync::Arc<dyn pdfbot_core::LearningApi>,
        config: ApiConfig,
    ) -> Result<Self> {
        let bundler = PdfBundler::with_api(api, config).context("Failed to create PDF bundler")?;

        Ok(Self { bundler })
    }
}
