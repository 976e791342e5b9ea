use async_trait::async_trait;
use bytes::Bytes;

use super::topic::Topic;
use crate::error::Result;
use crate::request::UnitId;

/// Information about an upstream API backend
#[derive(Debug, Clone)]
pub struct ApiInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Host the backend talks to
    pub base_url: String,
}

/// The two calls pdfbot makes against the learning platform.
///
/// Both forward the caller's bearer token unmodified.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// Get information about this backend
    fn info(&self) -> ApiInfo;

    /// List the topics of a unit, in the order the platform returns them.
    ///
    /// A response without `payload.topics` yields an empty list.
    async fn list_topics(&self, unit_id: &UnitId, access_token: &str) -> Result<Vec<Topic>>;

    /// Download one document. No retries.
    async fn fetch_pdf(&self, url: &str, access_token: &str) -> Result<Bytes>;
}
