//! Custom error types for the application.
//!
//! This module defines the primary error type, `ClientError`, for the entire
//! application. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures the client can
//! run into: transport-level HTTP errors, structured API error responses,
//! and local storage problems. Health-socket failures never surface as
//! values; they collapse to a Disconnected status inside the socket task.
//!
//! The `Api` variant deserves a note: the computation server answers invalid
//! requests with a JSON body describing the problem (FastAPI-style
//! `{"detail": ...}`). That body, along with the HTTP status, is preserved so
//! the lab output panel can render it instead of a result.

use serde_json::Value;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} {status_text}")]
    Api {
        status: u16,
        status_text: String,
        detail: Value,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_displays_status_line() {
        let err = ClientError::Api {
            status: 422,
            status_text: "Unprocessable Entity".to_string(),
            detail: json!("bad expression"),
        };
        assert_eq!(err.to_string(), "API error 422 Unprocessable Entity");
    }

    #[test]
    fn invalid_url_error_carries_the_url() {
        let err = ClientError::InvalidApiUrl("ftp://nope".to_string());
        assert!(err.to_string().contains("ftp://nope"));
    }
}
