//! Error types for chat log tailing

use std::path::PathBuf;
use thiserror::Error;

/// Errors during log file reading operations
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open log file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file metadata for {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to seek in file {path}")]
    Seek {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gave up tailing {path} after {attempts} consecutive failures")]
    TooManyFailures {
        path: PathBuf,
        attempts: u32,
        #[source]
        last: Box<ReaderError>,
    },
}
