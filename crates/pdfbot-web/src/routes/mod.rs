//! HTTP route handlers for the pdfbot web server.
//!
//! The only API route is `POST /`; everything else is static files.

mod merge;

pub use merge::merge_unit;

use serde::Deserialize as SerdeDeserialize;
use serde_json::Value;

/// JSON body of `POST /`.
///
/// Fields stay untyped so that wrong types are reported like missing ones.
#[derive(SerdeDeserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub access_token: Option<Value>,
    #[serde(default)]
    pub unit_id: Option<Value>,
}
