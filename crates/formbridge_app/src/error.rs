//! Error types for formbridge_app

use crate::bridge::BridgePhase;
use formbridge_editor::EditorError;
use thiserror::Error;

/// Errors that can occur while running the editor bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Asynchronous editor library acquisition failed
    #[error("Editor library acquisition failed: {0}")]
    Acquisition(#[source] EditorError),

    /// The editor library rejected construction
    #[error("Editor construction failed: {0}")]
    Construction(#[source] EditorError),

    /// The bridge was asked to start a second time
    #[error("Bridge already started (phase: {0})")]
    AlreadyStarted(BridgePhase),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Other(err.to_string())
    }
}

/// Result type for formbridge_app operations
pub type Result<T> = std::result::Result<T, BridgeError>;
