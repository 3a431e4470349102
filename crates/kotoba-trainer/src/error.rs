//! Trainer errors.

use kotoba_core::KotobaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Kotoba(#[from] KotobaError),

    #[error("no usable training sentences ({skipped} skipped)")]
    EmptyTrainingSet { skipped: usize },

    #[error("treebank line {line}: {source}")]
    Treebank {
        line: usize,
        #[source]
        source: KotobaError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainError>;
