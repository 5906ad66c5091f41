//! Image ingestion.
//!
//! Turns image bytes, files and data URIs into what the editor needs to place
//! an image: a self-contained data URI and the intrinsic pixel size.

use std::path::Path;

use base64::Engine;
use folio_core::Size;

use crate::error::{RenderError, RenderResult};

/// A decoded image ready to be placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedImage {
    /// `data:<mime>;base64,<payload>` URI of the original bytes.
    pub data_uri: String,
    /// Intrinsic size in pixels.
    pub intrinsic: Size,
    /// MIME type detected from the content.
    pub mime: &'static str,
}

/// Decode image bytes.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the image cannot be
/// decoded.
#[allow(clippy::cast_precision_loss)]
pub fn ingest_bytes(data: &[u8]) -> RenderResult<IngestedImage> {
    let format = image::guess_format(data)
        .map_err(|e| RenderError::Resource(format!("Unrecognized image format: {e}")))?;

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let mime = format.to_mime_type();
    let payload = base64::engine::general_purpose::STANDARD.encode(data);
    tracing::debug!("Ingested {}x{} {mime}", img.width(), img.height());

    Ok(IngestedImage {
        data_uri: format!("data:{mime};base64,{payload}"),
        intrinsic: Size::new(img.width() as f32, img.height() as f32),
        mime,
    })
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn ingest_file(path: impl AsRef<Path>) -> RenderResult<IngestedImage> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    ingest_bytes(&data).inspect_err(|e| tracing::warn!("Cannot ingest {}: {e}", path.display()))
}

/// Decode a base64 data URI such as `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns an error if the URI is malformed, not base64, or the image cannot
/// be decoded.
pub fn ingest_data_uri(uri: &str) -> RenderResult<IngestedImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if !metadata.ends_with(";base64") {
        return Err(RenderError::Resource(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?;

    ingest_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 red PNG
    const RED_PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn png_bytes() -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(RED_PIXEL_PNG)
            .expect("valid base64")
    }

    #[test]
    fn ingest_png_bytes() {
        let image = ingest_bytes(&png_bytes()).expect("decode");
        assert_eq!(image.intrinsic, Size::new(1.0, 1.0));
        assert_eq!(image.mime, "image/png");
        assert_eq!(
            image.data_uri,
            format!("data:image/png;base64,{RED_PIXEL_PNG}")
        );
    }

    #[test]
    fn ingest_data_uri_round_trip() {
        let uri = format!("data:image/png;base64,{RED_PIXEL_PNG}");
        let image = ingest_data_uri(&uri).expect("decode");
        assert_eq!(image.data_uri, uri);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ingest_bytes(&[1, 2, 3]).is_err());
        assert!(ingest_data_uri("not-a-uri").is_err());
        assert!(ingest_data_uri("data:image/png;base64").is_err());
        assert!(ingest_data_uri("data:image/png,abc").is_err());
        assert!(ingest_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn ingest_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, png_bytes()).expect("write");

        let image = ingest_file(&path).expect("ingest");
        assert_eq!(image.intrinsic, Size::new(1.0, 1.0));
        assert!(ingest_file(dir.path().join("missing.png")).is_err());
    }
}
