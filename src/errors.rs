//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching and validating feeds.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Upstream returned an error status
    #[error("{source_name} returned HTTP {status}: {message}")]
    Api {
        source_name: &'static str,
        status: u16,
        message: String,
    },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Feature validation failed
    #[error("Invalid feature data: {0}")]
    Validation(String),
}
