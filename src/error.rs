//! Errors surfaced by the collaborators around the scoring core: record
//! loading, configuration and the HTTP plumbing. The core itself is infallible.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported record format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("analysis task failed: {0}")]
    Task(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
