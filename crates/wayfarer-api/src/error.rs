//! Error types surfaced by the API client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::StorageError;

/// Message used when a failed response carries no `error` field.
pub const FALLBACK_MESSAGE: &str = "API request failed";

/// Failure of a single API call.
///
/// Transport failures ([`ApiError::Network`], [`ApiError::Decode`]) mean the
/// exchange itself broke down; [`ApiError::Request`] means the server
/// answered with a non-success status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid JSON in response (HTTP {status}): {message}")]
    Decode { status: StatusCode, message: String },

    #[error("{message} (HTTP {status})")]
    Request { status: StatusCode, message: String },

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether the failure happened below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decode { .. })
    }

    /// HTTP status of the failed response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Decode { status, .. } | Self::Request { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            Self::Encode(_) | Self::Storage(_) => None,
        }
    }

    /// Server-supplied message for [`ApiError::Request`].
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Request { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Build the error for a non-success response from its raw body.
///
/// The body must be JSON; its `error` string becomes the message.
pub(crate) fn from_error_body(status: StatusCode, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => {
            let message = value
                .get("error")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or(FALLBACK_MESSAGE)
                .to_owned();
            ApiError::Request { status, message }
        }
        Err(err) => ApiError::Decode {
            status,
            message: err.to_string(),
        },
    }
}
