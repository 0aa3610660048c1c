//! Error types for the dropbox_files crate.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

/// Errors that can occur when talking to the Dropbox API.
#[derive(Error, Debug)]
pub enum DropboxError {
    #[error("Client setting not configured: {0}")]
    MissingConfiguration(&'static str),

    #[error("Required option not set: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid response received from the Dropbox API (status: {})", .0.status())]
    RemoteApiError(Box<HttpResponse>),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unrecognized metadata variant: {tag}")]
    UnrecognizedVariant { tag: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Failed to read config file: {0}")]
    ConfigFileError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParseError(String),
}

/// Dropbox JSON error envelope, e.g. `{"error_summary": "path/not_found/..", "error": {..}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error_summary: Option<String>,
}

impl DropboxError {
    /// The raw response behind a [`DropboxError::RemoteApiError`].
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            DropboxError::RemoteApiError(response) => Some(response),
            _ => None,
        }
    }

    /// HTTP status code of a remote API error.
    pub fn status(&self) -> Option<u16> {
        self.response().map(HttpResponse::status)
    }

    /// The `error_summary` of a remote API error, if the body carries one.
    pub fn api_error_summary(&self) -> Option<String> {
        let response = self.response()?;
        serde_json::from_slice::<ApiErrorEnvelope>(response.body())
            .ok()
            .and_then(|envelope| envelope.error_summary)
    }
}

/// Result type alias for DropboxError.
pub type Result<T> = std::result::Result<T, DropboxError>;
