use std::time::Duration;

use thiserror::Error;

/// Errors returned by collaborator calls.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The collaborator answered with a non-success status.
    #[error("{service} returned status {code}: {message}")]
    Status {
        service: &'static str,
        code: u16,
        message: String,
    },

    /// The call did not complete within the configured bound.
    #[error("{service} call timed out after {after:?}")]
    Timeout {
        service: &'static str,
        after: Duration,
    },

    /// A network or transport-level error occurred.
    #[error("{service} connection error: {message}")]
    Connection {
        service: &'static str,
        message: String,
    },

    /// A request or response body could not be (de)serialized.
    #[error("{service} serialization error: {message}")]
    Serialization {
        service: &'static str,
        message: String,
    },

    /// A caller-supplied id cannot be used as a single URL path segment.
    #[error("{service} rejected path segment {segment:?}")]
    InvalidPathSegment {
        service: &'static str,
        segment: String,
    },

    /// The client was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl RpcError {
    /// Status code reported alongside upstream failures in HTTP error bodies.
    ///
    /// Collaborator statuses are passed through. A rejected id is 400, a
    /// timeout 504 and any other local failure 502.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status { code, .. } => *code,
            Self::Timeout { .. } => 504,
            Self::InvalidPathSegment { .. } => 400,
            Self::Connection { .. } | Self::Serialization { .. } | Self::Configuration(_) => 502,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
