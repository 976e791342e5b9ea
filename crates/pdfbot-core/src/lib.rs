//! pdfbot Core Library
//!
//! Builds one PDF out of a course unit's topic documents:
//! - Topic listing against the learning platform API
//! - Authenticated document downloads
//! - Page-order-preserving PDF merging
//! - A per-request log describing what was attempted

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod pdf;
pub mod request;
pub mod util;

pub use api::{ApiInfo, LearningApi, TesseractClient, Topic, create_api};
pub use config::{
    ApiConfig, AppConfig, DEFAULT_API_BASE, DEFAULT_PDF_BASE, DEFAULT_PORT, ServerConfig,
};
pub use error::{Error, Result};
pub use log::RequestLog;
pub use pdf::{MergedPdf, merge_pdfs, page_count};
pub use request::{BundleRequest, UnitId};

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Log line written after the topic list arrives
pub fn topics_found_line(count: usize) -> String {
    format!("Found {count} topics")
}

/// Prefix of the log line written for each document that could not be fetched
pub const FETCH_ERROR_PREFIX: &str = "Error processing PDF: ";
/// Log line written right before merging
pub const MERGING_LINE: &str = "Merging PDFs...";
/// Prefix of the log line written when a request fails as a whole
pub const REQUEST_ERROR_PREFIX: &str = "Error in fetching or processing the data: ";

/// Fetches a unit's topic documents and merges them into one PDF
pub struct PdfBundler {
    api: Arc<dyn LearningApi>,
    config: ApiConfig,
}

impl PdfBundler {
    /// Create a bundler talking to the configured platform
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let api = create_api(&config)?;

        Ok(Self { api, config })
    }

    /// Create with a custom API backend
    pub fn with_api(api: Arc<dyn LearningApi>, config: ApiConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { api, config })
    }

    /// Run one bundle request.
    ///
    /// Returns `Ok(None)` when no topic yielded a document. Per-topic download
    /// failures are written to `log` and skipped; any other failure is written
    /// to `log` and returned.
    pub async fn bundle(
        &self,
        request: &BundleRequest,
        log: &mut RequestLog,
    ) -> Result<Option<MergedPdf>> {
        match self.bundle_impl(request, log).await {
            Ok(merged) => Ok(merged),
            Err(e) => {
                error!("Bundle for unit {} failed: {}", request.unit_id(), e);
                log.push(format!("{REQUEST_ERROR_PREFIX}{e}"));
                Err(e)
            }
        }
    }

    async fn bundle_impl(
        &self,
        request: &BundleRequest,
        log: &mut RequestLog,
    ) -> Result<Option<MergedPdf>> {
        let topics = self
            .api
            .list_topics(request.unit_id(), request.access_token())
            .await?;
        info!("Unit {}: {} topics", request.unit_id(), topics.len());
        log.push(topics_found_line(topics.len()));

        let documents = self
            .fetch_documents(&topics, request.access_token(), log)
            .await;

        if documents.is_empty() {
            info!("Unit {}: no documents to merge", request.unit_id());
            return Ok(None);
        }

        log.push(MERGING_LINE);
        let document_count = documents.len();
        info!("Merging {} documents for unit {}", document_count, request.unit_id());

        // lopdf parsing is CPU-bound
        let bytes = tokio::task::spawn_blocking(move || merge_pdfs(&documents))
            .await
            .map_err(|e| Error::PdfMerge(format!("merge task failed: {e}")))??;

        Ok(Some(MergedPdf::new(bytes, document_count)))
    }

    /// Download every topic document, keeping topic order.
    ///
    /// At most `fetch_concurrency` downloads are in flight; results are
    /// consumed in submission order regardless of completion order.
    async fn fetch_documents(
        &self,
        topics: &[Topic],
        access_token: &str,
        log: &mut RequestLog,
    ) -> Vec<Bytes> {
        let api = &self.api;
        let urls: Vec<String> = topics
            .iter()
            .filter_map(Topic::pdf_path)
            .map(|path| self.config.pdf_url(path))
            .collect();

        debug!(
            "Fetching {} documents ({} at a time)",
            urls.len(),
            self.config.fetch_concurrency
        );

        let results: Vec<(String, Result<Bytes>)> = stream::iter(urls)
            .map(|url| async move {
                let result = api.fetch_pdf(&url, access_token).await;
                (url, result)
            })
            .buffered(self.config.fetch_concurrency)
            .collect()
            .await;

        let mut documents = Vec::with_capacity(results.len());
        for (url, result) in results {
            match result {
                Ok(bytes) => {
                    debug!("Fetched {} ({} bytes)", url, bytes.len());
                    documents.push(bytes);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    log.push(format!("{FETCH_ERROR_PREFIX}{e}"));
                }
            }
        }

        documents
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn api_info(&self) -> ApiInfo {
        self.api.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines() {
        assert_eq!(topics_found_line(3), "Found 3 topics");
        assert_eq!(
            format!("{FETCH_ERROR_PREFIX}boom"),
            "Error processing PDF: boom"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ApiConfig {
            fetch_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            PdfBundler::new(config),
            Err(Error::ConfigInvalid { .. })
        ));
    }
}
