//! Error types for the transport.
//!
//! # Taxonomy
//! - Transport: connection failures, timeouts, discovery endpoint down
//! - Cancelled: the call's [`Context`](crate::context::Context) fired first
//! - Remote: a structured [`YtError`] decoded from a header or body
//! - Protocol: malformed parameters, empty proxy lists, undecodable replies
//!
//! Retry decisions belong to the caller; [`Error::kind`] and
//! [`Error::contains_error_code`] give it what it needs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guid::ParseGuidError;
use crate::yson::YsonError;

/// A structured error reported by the cluster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YtError {
    #[serde(default)]
    pub code: i32,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_errors: Vec<YtError>,
}

impl YtError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_inner(mut self, inner: YtError) -> Self {
        self.inner_errors.push(inner);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Find the first error in this tree carrying `code`.
    pub fn find_code(&self, code: i32) -> Option<&YtError> {
        if self.code == code {
            return Some(self);
        }
        self.inner_errors.iter().find_map(|inner| inner.find_code(code))
    }

    pub fn contains_code(&self, code: i32) -> bool {
        self.find_code(code).is_some()
    }
}

impl fmt::Display for YtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)?;
        for inner in &self.inner_errors {
            write!(f, "; {inner}")?;
        }
        Ok(())
    }
}

impl std::error::Error for YtError {}

/// Broad class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Cancelled,
    Remote,
    Protocol,
}

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, timeout or body streaming failure in the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call's context was cancelled.
    #[error("call cancelled")]
    Cancelled,

    /// The call's deadline passed.
    #[error("call deadline exceeded")]
    DeadlineExceeded,

    /// The cluster rejected the call.
    #[error("yt: {0}")]
    Yt(#[from] YtError),

    /// `X-YT-Error` was present but is not a valid error document.
    #[error("yt: malformed 'X-YT-Error' header: {0}")]
    MalformedErrorHeader(#[source] serde_json::Error),

    /// Non-2xx reply with no decodable error.
    #[error("unexpected status code {status}")]
    UnexpectedStatus { status: u16 },

    /// The `/hosts` endpoint answered with a non-200 status.
    #[error("proxy discovery failed with status {status}")]
    DiscoveryStatus { status: u16 },

    /// The `/hosts` endpoint returned no proxies.
    #[error("proxy list is empty")]
    EmptyProxyList,

    /// The `/hosts` body is not a JSON array of strings.
    #[error("malformed proxy list: {0}")]
    MalformedProxyList(#[source] serde_json::Error),

    /// Call parameters cannot be encoded into the parameters header.
    #[error("invalid call parameters: {0}")]
    InvalidParams(String),

    #[error("yson: {0}")]
    Yson(#[from] YsonError),

    #[error(transparent)]
    Guid(#[from] ParseGuidError),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("token contains bytes not allowed in a header")]
    InvalidToken,

    #[error("unknown verb {0:?}")]
    UnknownVerb(String),

    /// The reply decoded but does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A write was attempted after the upload had already concluded.
    #[error("write stream aborted: {0}")]
    WriteAborted(String),

    /// The upload task ended without reporting an outcome.
    #[error("write task ended without reporting an outcome")]
    WriteTaskLost,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_)
            | Error::DiscoveryStatus { .. }
            | Error::WriteAborted(_)
            | Error::WriteTaskLost => ErrorKind::Transport,
            Error::Cancelled | Error::DeadlineExceeded => ErrorKind::Cancelled,
            Error::Yt(_) => ErrorKind::Remote,
            Error::MalformedErrorHeader(_)
            | Error::UnexpectedStatus { .. }
            | Error::EmptyProxyList
            | Error::MalformedProxyList(_)
            | Error::InvalidParams(_)
            | Error::Yson(_)
            | Error::Guid(_)
            | Error::InvalidUrl(_)
            | Error::InvalidToken
            | Error::UnknownVerb(_)
            | Error::UnexpectedResponse(_) => ErrorKind::Protocol,
        }
    }

    pub fn as_yt_error(&self) -> Option<&YtError> {
        match self {
            Error::Yt(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a structured error with `code` appears anywhere in this error.
    pub fn contains_error_code(&self, code: i32) -> bool {
        self.as_yt_error().is_some_and(|err| err.contains_code(code))
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
