//! Error types for editor operations.

use thiserror::Error;

use crate::range::RangeError;

/// Result type for editor operations.
pub type FolioResult<T> = Result<T, FolioError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Element not found in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Batch export targets must be text elements.
    #[error("Element is not a text element: {0}")]
    NotText(String),

    /// Batch range pattern was rejected.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Project payload could not be loaded; the store was left unchanged.
    #[error("Failed to load project: {0}")]
    LoadFailure(String),

    /// Project serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while reading or writing a project.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rasterization, assembly or save failed mid-export.
    #[error("Export failed: {0}")]
    ExportFailure(String),

    /// An export is already in progress.
    #[error("An export is already in progress")]
    Busy,

    /// The user declined a confirmation prompt.
    #[error("Operation declined: {0}")]
    Declined(String),
}
