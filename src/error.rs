use std::path::PathBuf;

use thiserror::Error;

/// Problems with the persisted record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store not found at {path:?}; run `prepare` first")]
    Missing { path: PathBuf },
}

/// Caller-supplied input that fails validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid {name}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("invalid {name}: {message}")]
    NotANumber { name: String, message: String },
    #[error("invalid word_scores JSON: {message}")]
    WordScores { message: String },
}

impl ValidationError {
    pub(crate) fn out_of_range(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            name: name.into(),
            value,
            min,
            max,
        }
    }

    pub(crate) fn word_scores(message: impl Into<String>) -> Self {
        Self::WordScores {
            message: message.into(),
        }
    }
}
