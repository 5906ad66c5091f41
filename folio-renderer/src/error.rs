//! Renderer error types.

use folio_core::FolioError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering or assembling pages.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// The pixmap could not be allocated or read.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// PDF assembly failed.
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    /// No pages were pushed before finishing.
    #[error("Document has no pages")]
    NoPages,

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for FolioError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => Self::Io(e),
            RenderError::Resource(msg) => Self::LoadFailure(msg),
            other => Self::ExportFailure(other.to_string()),
        }
    }
}
