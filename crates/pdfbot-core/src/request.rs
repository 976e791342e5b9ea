//! Validated input of a bundle request.

use serde_json::Value;
use std::borrow::Cow;

use crate::error::{Error, Result};

/// Identifier of a course unit on the learning platform.
///
/// Clients send it either as a JSON string or a JSON number; both are kept
/// as the text that goes into the topics URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId(String);

impl UnitId {
    /// A unit id from text, `None` when empty
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()).then_some(Self(id))
    }

    /// A unit id from a JSON request field.
    ///
    /// Empty strings, zero, `null`, booleans, arrays and objects are all
    /// treated as "not provided".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    (i != 0).then(|| Self(i.to_string()))
                } else if let Some(u) = n.as_u64() {
                    Some(Self(u.to_string()))
                } else {
                    n.as_f64().filter(|f| *f != 0.0).map(|f| Self(format_float(f)))
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id percent-encoded for use as one URL path segment
    pub fn path_segment(&self) -> Cow<'_, str> {
        urlencoding::encode(&self.0)
    }
}

/// Integral floats render without a fractional part (`12.0` -> `12`).
#[allow(clippy::cast_possible_truncation)]
fn format_float(f: f64) -> String {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if f.fract() == 0.0 && f.abs() < MAX_EXACT {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access token plus unit id, both known to be present.
#[derive(Clone)]
pub struct BundleRequest {
    access_token: String,
    unit_id: UnitId,
}

impl BundleRequest {
    /// Fails with `MissingParameters` unless both values are present and non-empty.
    pub fn new(access_token: Option<&str>, unit_id: Option<UnitId>) -> Result<Self> {
        match (crate::util::non_empty(access_token), unit_id) {
            (Some(token), Some(unit_id)) => Ok(Self {
                access_token: token.to_string(),
                unit_id,
            }),
            _ => Err(Error::MissingParameters),
        }
    }

    /// Validate the raw JSON fields of an HTTP request body
    pub fn from_json_fields(access_token: Option<&Value>, unit_id: Option<&Value>) -> Result<Self> {
        Self::new(
            access_token.and_then(Value::as_str),
            unit_id.and_then(UnitId::from_json),
        )
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub const fn unit_id(&self) -> &UnitId {
        &self.unit_id
    }
}

impl std::fmt::Debug for BundleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleRequest")
            .field("unit_id", &self.unit_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
