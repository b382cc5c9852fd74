//! Normalized API errors
//!
//! Every failure coming out of the HTTP layer is translated exactly once into an
//! `ApiError`, so callers never see transport library errors.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Code carried by errors where no response arrived
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Code carried by errors where the request could not be built or sent
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

const SERVER_ERROR_MESSAGE: &str = "Server error";
const NETWORK_ERROR_MESSAGE: &str = "Could not connect to the server";

/// A failed API call
///
/// Exactly one case holds per error: the server answered with a non-success
/// status, the request went out but no response came back, or the request never
/// left the client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server responded with a non-2xx status
    #[error("{message} (status {status})")]
    Server {
        status: u16,
        message: String,
        /// Machine-readable code supplied by the server, if any
        code: Option<String>,
    },

    /// No response was received (connection refused, timeout, dropped connection)
    #[error("{message}")]
    Network { message: String },

    /// The request could not be constructed or the outcome was unrecognized
    #[error("{message}")]
    Unknown { message: String },
}

/// Optional error fields a server may put in an error body
///
/// Fields are kept untyped so a numeric `code` does not discard the message.
#[derive(Debug, Default, Deserialize)]
struct ServerErrorBody {
    #[serde(default, alias = "Message")]
    message: Option<serde_json::Value>,
    #[serde(default, alias = "Code")]
    code: Option<serde_json::Value>,
}

/// Renders a scalar JSON field as text; objects, arrays and null yield nothing
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl ApiError {
    /// Human-readable message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Server { message, .. }
            | ApiError::Network { message }
            | ApiError::Unknown { message } => message,
        }
    }

    /// HTTP status, present only when the server responded
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Server { code, .. } => code.as_deref(),
            ApiError::Network { .. } => Some(NETWORK_ERROR),
            ApiError::Unknown { .. } => Some(UNKNOWN_ERROR),
        }
    }

    /// Builds the error for a non-success response and its raw body
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: ServerErrorBody = serde_json::from_str(body).unwrap_or_default();
        let error = ApiError::Server {
            status,
            message: parsed
                .message
                .and_then(scalar_text)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string()),
            code: parsed.code.and_then(scalar_text),
        };
        warn!(status, "API Response Error: {}", error);
        error
    }

    /// Classifies a transport error from the HTTP client
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let error = if err.is_builder() || err.is_decode() {
            ApiError::Unknown {
                message: err.to_string(),
            }
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            ApiError::Network {
                message: NETWORK_ERROR_MESSAGE.to_string(),
            }
        } else {
            ApiError::Unknown {
                message: err.to_string(),
            }
        };
        warn!(error = %err, "API Request Error: {}", error);
        error
    }

    /// A request target that does not form a valid URL
    pub(crate) fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        ApiError::Unknown {
            message: format!("Invalid request URL '{}': {}", url, reason),
        }
    }

    /// A 2xx response whose body does not match the expected shape
    pub(crate) fn decode(err: serde_json::Error) -> Self {
        ApiError::Unknown {
            message: format!("Failed to parse response: {}", err),
        }
    }

    /// The user listing came back empty
    pub(crate) fn no_user() -> Self {
        ApiError::Unknown {
            message: "No user found on the media server".to_string(),
        }
    }
}
