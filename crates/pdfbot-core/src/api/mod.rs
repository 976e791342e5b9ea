mod tesseract;
mod topic;
mod traits;

pub use tesseract::TesseractClient;
pub use topic::{Topic, TopicsResponse};
pub use traits::{ApiInfo, LearningApi};

use crate::config::ApiConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the upstream API client from configuration
pub fn create_api(config: &ApiConfig) -> Result<Arc<dyn LearningApi>> {
    let client = TesseractClient::new(config)?;

    Ok(Arc::new(client))
}
