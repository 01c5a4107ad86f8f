//! Error taxonomy shared by the probe client.
//!
//! Configuration failures are fatal at startup. Everything raised while
//! probing is scoped to one target and one round, so those types are
//! `Clone` and travel inside reports rather than aborting the loop.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed configuration: {0}")]
    Malformed(String),

    #[error("target #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("target #{index} has an unusable address `{address}`")]
    InvalidAddress { index: usize, address: String },

    #[error("configuration defines no targets")]
    NoTargets,
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NetworkErrorKind {
    ConnectionRefused,
    Timeout,
    Dns,
    HttpStatus,
    Other,
}

impl NetworkErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            NetworkErrorKind::ConnectionRefused => "connection_refused",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Dns => "dns",
            NetworkErrorKind::HttpStatus => "http_status",
            NetworkErrorKind::Other => "network",
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind}: {message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("transfer ended after {received} of {expected} bytes")]
pub struct IncompleteTransferError {
    pub received: u64,
    pub expected: u64,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ThroughputError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Incomplete(#[from] IncompleteTransferError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal unavailable: {0}")]
    Terminal(#[from] io::Error),
}
