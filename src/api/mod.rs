//! Media server API access
//!
//! This module provides the HTTP client for a Jellyfin-compatible server and the
//! normalized error type every request failure is translated into.

mod client;
mod error;

pub use client::{ApiClient, ImageKind, RequestOptions, AUTH_HEADER};
pub use error::{ApiError, NETWORK_ERROR, UNKNOWN_ERROR};
