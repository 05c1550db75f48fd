use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a chat submission was turned away before anything was appended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("input is empty")]
    Empty,
    #[error("input exceeds {max} characters")]
    TooLong { max: usize },
    #[error("a rewrite is already in flight")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteFailureKind {
    Network,
    Timeout,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rewrite failed ({kind:?}): {message}")]
pub struct RewriteFailure {
    pub kind: RewriteFailureKind,
    pub message: String,
}

impl RewriteFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: RewriteFailureKind::Network,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: RewriteFailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            kind: RewriteFailureKind::Server,
            message: message.into(),
        }
    }
}

/// Error reported by the identity provider. The message is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardFailure(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no rewrite is in flight")]
    NotAwaiting,
    #[error("unknown message id {0}")]
    UnknownMessage(String),
    #[error(transparent)]
    Clipboard(#[from] ClipboardFailure),
}
