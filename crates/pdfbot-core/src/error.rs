use thiserror::Error;

/// Unified error type for pdfbot-core
///
/// Display strings double as the lines written to a request's log, so they
/// read the way the web client expects them.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Request Errors
    // ==========================================================================
    /// Access token or unit id absent or empty
    #[error("Missing required parameters")]
    MissingParameters,

    // ==========================================================================
    // Upstream Topics API Errors
    // ==========================================================================
    /// Topics API answered with a non-success status
    #[error("API request failed with status: {status}")]
    UpstreamApi { status: u16 },

    /// Topics API could not be reached
    #[error("API request failed: {0}")]
    UpstreamRequest(String),

    /// Topics API body was not the JSON we expect
    #[error("invalid topics API response: {0}")]
    UpstreamResponse(String),

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// PDF host answered with a non-success status
    #[error("Error fetching PDF: Failed to fetch PDF from URL: {url}")]
    PdfFetchStatus { url: String, status: u16 },

    /// Transport failure while downloading a PDF
    #[error("Error fetching PDF: {reason}")]
    PdfFetchTransport { url: String, reason: String },

    /// Failed to parse, combine or save the merged document
    #[error("failed to merge PDFs: {0}")]
    PdfMerge(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    /// Failed to build the HTTP client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_messages_match_request_log_format() {
        let err = Error::PdfFetchStatus {
            url: "https://example.test/a.pdf".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Error fetching PDF: Failed to fetch PDF from URL: https://example.test/a.pdf"
        );

        let err = Error::UpstreamApi { status: 404 };
        assert_eq!(err.to_string(), "API request failed with status: 404");
    }
}
