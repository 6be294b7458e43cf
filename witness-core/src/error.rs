//! Error types for witness-core.

use thiserror::Error;

/// Result type alias using witness-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during contemplation.
#[derive(Error, Debug)]
pub enum Error {
    /// Mode name outside the closed set of thought modes
    #[error("Unknown thought mode: {mode:?}")]
    UnknownMode { mode: String },

    /// Recursion depth below one
    #[error("Invalid recursion depth {depth}: depth must be at least 1")]
    InvalidDepth { depth: i64 },

    /// Recursion depth above the accepted maximum
    #[error("Recursion depth {depth} out of range (1-{max})")]
    DepthOutOfRange { depth: i64, max: u32 },

    /// Generation backend call failed
    #[error("{provider} backend error: {message}")]
    Backend { provider: String, message: String },

    /// Timeout imposed at the client boundary
    #[error("Generation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an unknown mode error.
    pub fn unknown_mode(mode: impl Into<String>) -> Self {
        Self::UnknownMode { mode: mode.into() }
    }

    /// Create an invalid depth error.
    pub fn invalid_depth(depth: i64) -> Self {
        Self::InvalidDepth { depth }
    }

    /// Create a backend error.
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Whether this error came from the generation backend rather than the caller's input.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_carries_cause() {
        let err = Error::backend("ollama", "connection refused");
        assert_eq!(err.to_string(), "ollama backend error: connection refused");
        assert!(err.is_backend());
    }

    #[test]
    fn test_input_errors_are_not_backend() {
        assert!(!Error::unknown_mode("unknown_mode").is_backend());
        assert!(!Error::invalid_depth(0).is_backend());
        assert!(Error::timeout(500).is_backend());
    }

    #[test]
    fn test_depth_errors_name_their_bound() {
        assert_eq!(
            Error::invalid_depth(0).to_string(),
            "Invalid recursion depth 0: depth must be at least 1"
        );
        let err = Error::DepthOutOfRange {
            depth: 11,
            max: 10,
        };
        assert_eq!(err.to_string(), "Recursion depth 11 out of range (1-10)");
    }
}
