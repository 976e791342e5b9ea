use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default Tesseract Online API host
pub const DEFAULT_API_BASE: &str = "https://api.tesseractonline.com";
/// Default prefix prepended to a topic's relative PDF path
pub const DEFAULT_PDF_BASE: &str = "https://api.tesseractonline.com/";
/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Upstream learning-platform API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the topics API (e.g., "https://api.tesseractonline.com")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Prefix the relative `pdf` path of each topic is appended to
    #[serde(default = "default_pdf_base")]
    pub pdf_base: String,

    /// Per-request timeout for upstream calls in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of PDF downloads in flight (1 = sequential)
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_pdf_base() -> String {
    DEFAULT_PDF_BASE.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_fetch_concurrency() -> usize {
    1
}

impl ApiConfig {
    /// URL of the topic listing for a unit (unit id must already be path-safe)
    pub fn topics_url(&self, unit_segment: &str) -> String {
        format!(
            "{}/studentmaster/get-topics-unit/{}",
            self.api_base.trim_end_matches('/'),
            unit_segment
        )
    }

    /// Full URL of a topic document.
    ///
    /// Plain concatenation: the relative path is appended to `pdf_base` as-is.
    pub fn pdf_url(&self, relative_path: &str) -> String {
        format!("{}{}", self.pdf_base, relative_path)
    }

    /// Reject values the fetch pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(invalid("api.api_base", "must not be empty"));
        }
        if self.pdf_base.trim().is_empty() {
            return Err(invalid("api.pdf_base", "must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("api.request_timeout_secs", "must be at least 1"));
        }
        if self.fetch_concurrency == 0 {
            return Err(invalid("api.fetch_concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::ConfigInvalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            pdf_base: default_pdf_base(),
            request_timeout_secs: default_request_timeout_secs(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as static files at `/` (defaults to ./public)
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.api.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/pdfbot/config.toml, ./config.toml)
    pub fn load() -> Self {
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("pdfbot").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_tesseract() {
        let config = AppConfig::default();
        assert_eq!(
            config.api.topics_url("42"),
            "https://api.tesseractonline.com/studentmaster/get-topics-unit/42"
        );
        assert_eq!(
            config.api.pdf_url("uploads/topic-1.pdf"),
            "https://api.tesseractonline.com/uploads/topic-1.pdf"
        );
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.api.fetch_concurrency, 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [api]
            fetch_concurrency = 4

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.api.fetch_concurrency, 4);
        assert_eq!(config.api.api_base, DEFAULT_API_BASE);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = AppConfig::from_toml("[api]\nfetch_concurrency = 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigInvalid { ref field, .. } if field == "api.fetch_concurrency"
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\napi_base = \"http://localhost:9000/\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.api.topics_url("7"),
            "http://localhost:9000/studentmaster/get-topics-unit/7"
        );
    }

    #[test]
    fn test_missing_file_is_config_load_error() {
        let err = AppConfig::from_file("/nonexistent/pdfbot/config.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }
}
