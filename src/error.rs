use thiserror::Error;

use crate::statement::Predecessor;

#[derive(Debug, Error)]
pub enum FincatError {
    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported input format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Statement `{0}` has no rows")]
    EmptyTable(String),

    #[error("Worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures of a classification pass. A pass that fails leaves its rows
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// No legal category exists for the row at `position` after `previous`.
    #[error("couldn't classify row {position}: no legal category follows {previous}")]
    Unclassifiable {
        position: usize,
        previous: Predecessor,
    },
}
