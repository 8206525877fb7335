//! Error types for the stream bridge.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A type-erased error produced by an upstream stream.
///
/// Cheap to clone so a failed store can re-raise the same error on every read.
#[derive(Clone)]
pub struct StreamError(Arc<dyn std::error::Error + Send + Sync>);

impl StreamError {
    /// Wrap any error type.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StreamError(Arc::new(error))
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        StreamError(Arc::new(MessageError(message.into())))
    }

    /// Whether two handles refer to the same underlying error.
    pub fn ptr_eq(&self, other: &StreamError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamError({})", self.0)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

/// Main error type for bridge operations.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("Stream factory failed: {0}")]
    Factory(StreamError),

    #[error("Upstream stream errored: {0}")]
    Upstream(StreamError),

    #[error("Subscription disposal failed: {0}")]
    Disposal(StreamError),

    #[error("Mount instance is not active")]
    NotActive,
}

impl BridgeError {
    /// The upstream error carried by this error, if any.
    pub fn stream_error(&self) -> Option<&StreamError> {
        match self {
            BridgeError::Factory(e) | BridgeError::Upstream(e) | BridgeError::Disposal(e) => {
                Some(e)
            }
            BridgeError::NotActive => None,
        }
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
