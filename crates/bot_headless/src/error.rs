//! Error types for the headless runner.

use thiserror::Error;

use bot_core::config::ConfigError;

use crate::scenario::ScenarioError;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Everything that can stop a headless run.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Scenario could not be loaded.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// Engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output or replay file IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON line could not be written.
    #[error("Failed to encode frame line: {0}")]
    Json(#[from] serde_json::Error),

    /// A replay could not be encoded or decoded.
    #[error("Failed to encode replay: {0}")]
    Replay(#[from] bincode::Error),

    /// Replay written by an incompatible version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    VersionMismatch {
        /// Version this build writes.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },
}
