//! Error taxonomy shared by the watcher pipeline

use crate::ledger::pool_address::PoolAddressError;
use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Every fatal failure the core can report. Attribute decode failures are
/// not part of this enum: they are recovered inside the snapshot builder.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("configuration error: {0}")]
    Configuration(#[from] PoolAddressError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("pagination error: {0}")]
    Pagination(String),

    #[error("output error: {0}")]
    Output(#[from] CheckpointError),

    #[error("run cancelled")]
    Cancelled,
}

pub type WatchResult<T> = std::result::Result<T, WatchError>;

impl WatchError {
    pub fn connection(err: impl fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    pub fn query(err: impl fmt::Display) -> Self {
        Self::Query(err.to_string())
    }

    pub fn pagination(err: impl fmt::Display) -> Self {
        Self::Pagination(err.to_string())
    }
}

/// Maps sqlx failures onto the taxonomy: anything that never reached the
/// server is a connection error, everything else a query error.
impl From<sqlx::Error> for WatchError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => Self::connection(err),
            _ => Self::query(err),
        }
    }
}

/// Pipeline stage a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Feed,
    Snapshot,
    Credit,
    Result,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Feed => "ledger feed",
            Self::Snapshot => "voter snapshot",
            Self::Credit => "credit lookup",
            Self::Result => "result write",
        };
        write!(f, "{name}")
    }
}

/// The single diagnostic of a failed run
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: WatchError,
}

impl RunError {
    pub fn new(stage: Stage, source: WatchError) -> Self {
        Self { stage, source }
    }
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
