use thiserror::Error;

use crate::models::Status;

pub type Result<T> = std::result::Result<T, MilvusError>;

#[derive(Error, Debug)]
pub enum MilvusError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Server error: {status:?} - {message}")]
    Server { status: Status, message: String },

    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MilvusError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        MilvusError::InvalidArgument(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        MilvusError::InvalidResponse(msg.into())
    }

    /// Wrap a non-success server status. The message is kept verbatim.
    pub fn from_status(status: Status, message: String) -> Self {
        MilvusError::Server { status, message }
    }

    /// Map a non-2xx HTTP status and body to an error.
    pub fn from_http_status(status: u16, message: String) -> Self {
        MilvusError::HttpStatus { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_argument_rejection_is_not_reinterpreted() {
        let err = MilvusError::from_status(Status::IllegalDimension, "bad dim".to_string());
        assert!(matches!(err, MilvusError::Server { status: Status::IllegalDimension, .. }));
    }

    #[test]
    fn test_from_status_keeps_server_errors() {
        let err = MilvusError::from_status(Status::CollectionNotExists, "no such".to_string());
        match err {
            MilvusError::Server { status, message } => {
                assert_eq!(status, Status::CollectionNotExists);
                assert_eq!(message, "no such");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = MilvusError::from_http_status(503, "unavailable".to_string());
        assert_eq!(err.to_string(), "HTTP status 503: unavailable");
    }
}
