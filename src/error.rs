//! Error types for txcat.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the [`Error`] enum below. Two outcomes that look like failures are *not*
//! errors: predicting without a loaded model (empty result) and predicting a
//! text with no usable tokens (the empty-string label).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::BackendKind;

/// The main error type for txcat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No artifact exists at the requested path.
    #[error("model file not found: {}", .path.display())]
    ModelNotFound { path: PathBuf },

    /// The artifact exists but could not be decoded as a model envelope.
    #[error("unable to load model file {}: {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// The requested backend cannot be built or loaded by this build.
    #[error(
        "{} requires the {backend} backend, which is not available in this build; \
         rebuild with the `statistical` feature or retrain with the fallback backend",
        describe_target(.path)
    )]
    BackendUnavailable {
        backend: BackendKind,
        path: Option<PathBuf>,
    },

    /// `fit` was called with inconsistent inputs.
    #[error("invalid training input: {0}")]
    InvalidTrainingInput(String),

    /// Malformed or incomplete training data.
    #[error("data error: {0}")]
    Data(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a [`Error::ModelLoad`] for `path`.
    pub fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`Error::InvalidTrainingInput`] for mismatched text/label lengths.
    pub fn length_mismatch(texts: usize, labels: usize) -> Self {
        Error::InvalidTrainingInput(format!(
            "got {texts} texts but {labels} labels; they must be the same length"
        ))
    }
}

fn describe_target(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("model file {}", p.display()),
        None => "this operation".to_string(),
    }
}

/// Result type alias for txcat operations.
pub type Result<T> = std::result::Result<T, Error>;
