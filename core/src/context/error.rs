//! Error types for context operations

use thiserror::Error;

use crate::combat_log::ReaderError;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("character '{name}' is not configured")]
    UnknownCharacter { name: String },

    #[error("character '{name}' is already configured")]
    DuplicateCharacter { name: String },
}

/// Errors ending a character pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("log tailing stopped")]
    Tailer(#[from] ReaderError),

    #[error("pipeline task failed")]
    Join(#[from] tokio::task::JoinError),
}
