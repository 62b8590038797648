//! HTTP executor errors

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use thiserror::Error;

use super::request::{HttpOutcome, ResponseHead};

/// Classification of [`HttpError`], usable in trip policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Cancelled,
    Serialization,
    Transport,
    ServerFault,
    Dispatch,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Serialization => "serialization",
            Self::Transport => "transport",
            Self::ServerFault => "server_fault",
            Self::Dispatch => "dispatch",
        };
        f.write_str(name)
    }
}

/// Failure reported by the HTTP transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Outcome error of one guarded HTTP call
#[derive(Error, Debug)]
pub enum HttpError {
    /// Deadline elapsed before the transport completed
    #[error("http connection timeout after {limit:?}")]
    Timeout { limit: Duration },

    /// Caller cancelled while the request was in flight
    #[error("http request cancelled")]
    Cancelled,

    /// POST payload could not be encoded; nothing was sent
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failed (connect, TLS, invalid header, ...)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server answered with a 5xx status. Renders as the status line.
    #[error("{status}")]
    ServerFault {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },

    /// The task running the transport panicked or was aborted
    #[error("http dispatch task failed: {0}")]
    Dispatch(String),
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Transport(_) => ErrorKind::Transport,
            Self::ServerFault { .. } => ErrorKind::ServerFault,
            Self::Dispatch(_) => ErrorKind::Dispatch,
        }
    }

    /// Response that came with the error, if any (5xx answers keep theirs)
    pub fn outcome(&self) -> Option<HttpOutcome> {
        match self {
            Self::ServerFault {
                status,
                headers,
                body,
            } => Some(HttpOutcome {
                response: Some(ResponseHead {
                    status: *status,
                    headers: headers.clone(),
                }),
                body: body.clone(),
            }),
            _ => None,
        }
    }
}
