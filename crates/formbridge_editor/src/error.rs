//! Editor error types

use thiserror::Error;

/// Errors from loading or constructing an editor
#[derive(Error, Debug)]
pub enum EditorError {
    /// No loader registered under the requested module specifier
    #[error("Editor module not registered: {0}")]
    ModuleNotRegistered(String),

    /// Asynchronous library acquisition failed
    #[error("Editor library load failed: {0}")]
    Load(String),

    /// The editor library rejected the options at construction
    #[error("Editor construction failed: {0}")]
    Construct(String),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
