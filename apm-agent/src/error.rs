use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// An error raised by agent operations.
///
/// Agent errors are an instrumentation concern. They are logged by the caller
/// and never surface through an application's return channel.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The flush attempt toward the backend failed.
    #[error("failed to flush telemetry: {0}")]
    Flush(String),
}

/// An application failure produced by a handler.
///
/// The error is shared behind an [`Arc`] so that the same value can be
/// captured as an error event and delivered to the host runtime without
/// changing shape. The message and the source chain of the original error are
/// preserved.
#[derive(Clone, Debug)]
pub struct HandlerError {
    inner: Arc<dyn Error + Send + Sync>,
}

impl HandlerError {
    /// Wraps an arbitrary error value.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Returns the error message.
    pub fn message(&self) -> String {
        self.inner.to_string()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);
