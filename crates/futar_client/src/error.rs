//! FUTÁR client error types

use thiserror::Error;

/// Errors that can occur while talking to the FUTÁR API
#[derive(Debug, Error)]
pub enum FutarError {
    /// A required argument is missing or malformed; raised before any request
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The service answered with an envelope whose code is not 200
    ///
    /// Displays exactly the envelope text.
    #[error("{text}")]
    Upstream {
        /// Envelope status code
        code: i64,
        /// Envelope status text
        text: String,
    },

    /// Connection to the FUTÁR service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Response body could not be read or is not a JSON envelope
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },
}

impl FutarError {
    /// Envelope code of an upstream failure
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Upstream { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true for local validation failures and upstream envelope errors
    ///
    /// Older consumers of this API classify both under a single
    /// invalid-argument kind.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::Upstream { .. })
    }

    /// Returns true if a caller may reasonably retry the request
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout { .. })
    }

    pub(crate) fn missing(fields: &[&str]) -> Self {
        Self::InvalidArgument(format!("missing required field(s): {}", fields.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_displays_text_only() {
        let err = FutarError::Upstream {
            code: 404,
            text: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.code(), Some(404));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_missing_names_fields() {
        let err = FutarError::missing(&["fromLat", "toLon"]);
        assert!(err.to_string().contains("fromLat, toLon"));
        assert!(err.is_invalid_argument());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(FutarError::ConnectionFailed("test".to_string()).is_retryable());
        assert!(FutarError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!FutarError::InvalidArgument("test".to_string()).is_retryable());
        assert!(!FutarError::ParseError("test".to_string()).is_retryable());
        assert!(!FutarError::ConfigurationError("test".to_string()).is_retryable());
        assert!(
            !FutarError::Upstream {
                code: 500,
                text: "Internal error".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = FutarError::Timeout { timeout_secs: 10 };
        assert!(err.to_string().contains("10"));

        let err = FutarError::InvalidArgument("stopId".to_string());
        assert!(err.to_string().contains("stopId"));
    }
}
