//! Gateway error classification.

use thiserror::Error;

/// A failed model call.
///
/// Variants separate unexpected model behavior (worth retrying) from
/// legitimate provider rejections that no amount of waiting will fix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a body that is not a completion.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The completion ended before producing an answer.
    #[error("incomplete response: {0}")]
    Incomplete(String),

    /// The provider answered with an error status or error body.
    #[error("provider returned {status}: {message}")]
    Provider {
        /// HTTP status, or the `code` of an in-band error body.
        status: u16,
        /// Provider supplied message.
        message: String,
    },
}

impl ModelError {
    /// Whether the failure is transient and the call may be retried.
    ///
    /// Transport, malformed and incomplete responses are transient, as are
    /// rate limits (429) and server-side errors (5xx). Other provider
    /// statuses (bad key, bad request) are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Malformed(_) | Self::Incomplete(_) => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
        }
    }
}
