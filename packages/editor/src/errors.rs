//! Error types for the editor

use thiserror::Error;

/// Bootstrap-level failures (loading configuration, reading action logs).
///
/// Editing operations themselves never return this; they log and degrade
/// to no-ops.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
