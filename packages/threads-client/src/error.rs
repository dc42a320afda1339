//! Error types for the Threads client.

use thiserror::Error;

/// Result type for Threads client operations.
pub type Result<T> = std::result::Result<T, ThreadsError>;

/// Threads client errors.
#[derive(Debug, Error)]
pub enum ThreadsError {
    /// Configuration error (missing credentials, bad base URL, client build failure)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid draft or call arguments, rejected before any network activity
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server rejected the call with a non-success status
    #[error("{method} {url} failed with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    RequestFailed {
        method: String,
        url: String,
        status: u16,
        /// The `error` field of the server's error payload, when present.
        message: Option<String>,
    },

    /// Network-level failure (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body was not valid JSON for the expected shape
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The two-phase publish workflow exhausted its retry budget
    #[error("failed to publish after {attempts} attempts")]
    PublishExhausted {
        attempts: usize,
        #[source]
        source: Box<ThreadsError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display_includes_server_message() {
        let err = ThreadsError::RequestFailed {
            method: "POST".into(),
            url: "https://graph.threads.net/123/threads".into(),
            status: 400,
            message: Some("Invalid media type".into()),
        };
        let text = err.to_string();
        assert!(text.contains("POST"));
        assert!(text.contains("400"));
        assert!(text.contains("Invalid media type"));
    }

    #[test]
    fn test_request_failed_display_without_server_message() {
        let err = ThreadsError::RequestFailed {
            method: "GET".into(),
            url: "https://graph.threads.net/123".into(),
            status: 500,
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "GET https://graph.threads.net/123 failed with status 500"
        );
    }

    #[test]
    fn test_publish_exhausted_preserves_cause() {
        let cause = ThreadsError::Transport("connection refused".into());
        let err = ThreadsError::PublishExhausted {
            attempts: 3,
            source: Box::new(cause),
        };
        let source = std::error::Error::source(&err).expect("source should be set");
        assert!(source.to_string().contains("connection refused"));
    }
}
