use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error kinds for the wiki pipeline
#[derive(Debug)]
pub enum WikiError {
    /// Path escapes the wiki root or is malformed
    InvalidPath,
    /// Resolved path does not exist on disk
    NotFound,
    /// I/O failure while reading a file
    Read(io::Error),
    /// A directory entry could not be listed during discovery
    Discovery(String),
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Read(err)
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            WikiError::InvalidPath => (StatusCode::BAD_REQUEST, "Invalid path").into_response(),
            WikiError::Read(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Read error: {}", e),
            )
                .into_response(),
            WikiError::Discovery(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Discovery error: {}", e),
            )
                .into_response(),
        }
    }
}
