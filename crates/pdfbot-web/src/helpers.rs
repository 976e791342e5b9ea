//! Helper types for route handlers.
//!
//! Maps core errors to HTTP status codes and builds the JSON envelope every
//! response shares.

use axum::{Json, http::StatusCode};
use pdfbot_core::{Error, RequestLog};
use serde::Serialize;

/// Standard result type for JSON route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, Json<MergeResponse>)>;

pub const MSG_MERGED: &str = "PDFs merged successfully";
pub const MSG_NOTHING_TO_MERGE: &str = "No PDFs found to merge";
pub const MSG_MISSING_PARAMETERS: &str = "Missing required parameters";
pub const MSG_REQUEST_FAILED: &str = "Error processing request";

/// Body of every `POST /` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub message: &'static str,
    /// Base64 merged PDF; only present when something was merged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_data: Option<String>,
    pub logs: RequestLog,
}

impl MergeResponse {
    pub const fn merged(pdf_data: String, logs: RequestLog) -> Self {
        Self {
            message: MSG_MERGED,
            pdf_data: Some(pdf_data),
            logs,
        }
    }

    pub const fn nothing_to_merge(logs: RequestLog) -> Self {
        Self {
            message: MSG_NOTHING_TO_MERGE,
            pdf_data: None,
            logs,
        }
    }

    /// Error envelope for a failed request, carrying the log so far
    pub fn from_error(error: &Error, logs: RequestLog) -> (StatusCode, Json<Self>) {
        let status = error_status(error);
        let message = if status == StatusCode::BAD_REQUEST {
            MSG_MISSING_PARAMETERS
        } else {
            MSG_REQUEST_FAILED
        };

        (
            status,
            Json(Self {
                message,
                pdf_data: None,
                logs,
            }),
        )
    }
}

/// HTTP status for a request-level failure.
///
/// Only missing input is the client's fault; everything else happened upstream
/// or while merging.
pub const fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::MissingParameters => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
