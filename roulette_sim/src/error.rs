//! Error types for the simulation harness and CLI.

use roulette_core::RouletteError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running simulations or moving history between files.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Roulette(#[from] RouletteError),

    #[error("Invalid CSV format: {0}")]
    InvalidCsv(String),

    #[error("Roster is empty: {0}")]
    EmptyRoster(PathBuf),

    #[error("Unsupported file type: {0} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

impl SimError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for harness operations.
pub type SimResult<T> = Result<T, SimError>;
