use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::topic::{Topic, TopicsResponse};
use super::traits::{ApiInfo, LearningApi};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::request::UnitId;

/// Tesseract Online API client
pub struct TesseractClient {
    client: Client,
    config: ApiConfig,
}

impl TesseractClient {
    /// Create a client whose every request is bounded by `request_timeout_secs`.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LearningApi for TesseractClient {
    fn info(&self) -> ApiInfo {
        ApiInfo {
            name: "Tesseract Online",
            base_url: self.config.api_base.clone(),
        }
    }

    async fn list_topics(&self, unit_id: &UnitId, access_token: &str) -> Result<Vec<Topic>> {
        let url = self.config.topics_url(&unit_id.path_segment());
        debug!("Listing topics from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Topics request failed: {}", e);
                Error::UpstreamRequest(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Topics API returned {} for unit {}", status, unit_id);
            return Err(Error::UpstreamApi {
                status: status.as_u16(),
            });
        }

        let body: TopicsResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamResponse(e.to_string()))?;

        Ok(body.into_topics())
    }

    async fn fetch_pdf(&self, url: &str, access_token: &str) -> Result<Bytes> {
        debug!("Fetching PDF {}", url);

        let transport = |e: reqwest::Error| Error::PdfFetchTransport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PdfFetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(transport)
    }
}
