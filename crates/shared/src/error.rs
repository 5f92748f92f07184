use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes a search can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    Unreachable,
    MalformedResponse,
    NoResults,
    HttpError { status: u16 },
    /// The gateway itself failed (e.g. panicked) rather than the catalog.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => f.write_str("unreachable"),
            Self::MalformedResponse => f.write_str("malformed response"),
            Self::NoResults => f.write_str("no results"),
            Self::HttpError { status } => write!(f, "http error {status}"),
            Self::Internal => f.write_str("internal error"),
        }
    }
}

/// Structured failure carried by a failed fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    #[serde(flatten)]
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unreachable, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    /// `message` is the server-provided text, kept verbatim.
    pub fn no_results(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoResults, message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpError { status }, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Unreachable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuery {
    #[error("search term must not be empty")]
    EmptyTerm,
    #[error("invalid base url '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
}
