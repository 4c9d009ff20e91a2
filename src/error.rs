//! Error types for instance metadata operations.

use thiserror::Error;

/// Errors that can occur while walking the instance metadata service.
///
/// Only [`Token`](MetadataError::Token), [`Request`](MetadataError::Request)
/// during token acquisition, and the output variants ever reach the caller of
/// the walk. Failures on individual nodes are folded into
/// [`MetadataNode::Absent`](crate::MetadataNode::Absent).
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The token endpoint answered with a non-200 status.
    #[error("token request rejected: http {0}")]
    Token(u16),

    /// Request timed out.
    #[error("request timeout")]
    Timeout,

    /// Metadata endpoint answered with a non-200 status.
    #[error("http {0}")]
    Http(u16),

    /// JSON parse or serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error.
    #[error("request failed: {0}")]
    Request(reqwest::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Response exceeds maximum allowed size.
    #[error("response too large: {0} bytes exceeds limit of {1} bytes")]
    TooLarge(usize, usize),
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MetadataError::Timeout
        } else {
            MetadataError::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            MetadataError::Token(403).to_string(),
            "token request rejected: http 403"
        );
        assert_eq!(MetadataError::Timeout.to_string(), "request timeout");
        assert_eq!(MetadataError::Http(404).to_string(), "http 404");
        assert_eq!(
            MetadataError::TooLarge(2048, 1024).to_string(),
            "response too large: 2048 bytes exceeds limit of 1024 bytes"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MetadataError::from(err);
        assert!(err.to_string().starts_with("json: "));
    }
}
