//! Per-request diagnostic log returned to the caller.

use serde::Serialize;

/// Ordered, append-only list of human-readable lines for one request.
///
/// Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestLog(Vec<String>);

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "pdfbot::request_log", "{}", line);
        self.0.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// Number of lines starting with `prefix`
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.0.iter().filter(|line| line.starts_with(prefix)).count()
    }
}
