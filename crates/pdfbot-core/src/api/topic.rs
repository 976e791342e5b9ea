use serde::{Deserialize, Deserializer};

/// One entry of a unit's topic list.
///
/// Only the document path is read; every other field the platform sends is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Topic {
    /// Path of the topic PDF relative to the PDF host
    #[serde(default, deserialize_with = "lenient_path")]
    pub pdf: Option<String>,
}

impl Topic {
    pub fn with_pdf(path: impl Into<String>) -> Self {
        Self {
            pdf: Some(path.into()),
        }
    }

    /// Relative PDF path, if the topic has a non-empty one
    pub fn pdf_path(&self) -> Option<&str> {
        crate::util::non_empty(self.pdf.as_deref())
    }
}

/// Non-string paths (numbers, objects) count as "no document".
fn lenient_path<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(path)) => Some(path),
        _ => None,
    })
}

/// Body of `GET /studentmaster/get-topics-unit/{unitId}`
#[derive(Debug, Default, Deserialize)]
pub struct TopicsResponse {
    #[serde(default, deserialize_with = "lenient_payload")]
    payload: Option<Payload>,
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default, deserialize_with = "lenient_topics")]
    topics: Vec<Topic>,
}

/// A payload that is not an object has no topics.
fn lenient_payload<'de, D>(deserializer: D) -> Result<Option<Payload>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Anything but an array is an empty topic list; entries that are not
/// objects become topics without a document.
fn lenient_topics<'de, D>(deserializer: D) -> Result<Vec<Topic>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(entries)) = value else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            serde_json::Value::Object(_) => serde_json::from_value(entry).unwrap_or_default(),
            _ => Topic::default(),
        })
        .collect())
}

impl TopicsResponse {
    /// Topics in upstream order; a missing `payload` or `topics` is empty.
    pub fn into_topics(self) -> Vec<Topic> {
        self.payload.map(|p| p.topics).unwrap_or_default()
    }
}
