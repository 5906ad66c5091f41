//! resvg/tiny-skia page rasterizer.

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{FolioResult, PageView, RasterImage, RasterOptions, Rasterizer};

use crate::error::{RenderError, RenderResult};
use crate::page::render_page_svg;

/// Font database used to lay out text.
pub use usvg::fontdb::Database as FontDatabase;

/// Rasterizes pages by drawing them as SVG and rendering with resvg.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<FontDatabase>,
}

impl SvgRasterizer {
    /// Create a rasterizer that can draw text with the system's fonts.
    #[must_use]
    pub fn new() -> Self {
        let mut fontdb = FontDatabase::new();
        fontdb.load_system_fonts();
        tracing::debug!("Loaded {} font faces", fontdb.len());
        Self::with_fontdb(fontdb)
    }

    /// Create a rasterizer over an explicit font database.
    #[must_use]
    pub fn with_fontdb(fontdb: FontDatabase) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Render a page synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if the page SVG cannot be parsed or the pixmap
    /// cannot be allocated.
    pub fn render(
        &self,
        page: &PageView<'_>,
        options: &RasterOptions,
    ) -> RenderResult<RasterImage> {
        let svg = render_page_svg(page, options);
        let pixmap = self.rasterize_svg(&svg)?;
        Ok(to_raster_image(&pixmap))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let opt = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Raster(format!("cannot allocate {px_w}x{px_h} pixmap")))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

#[async_trait]
impl Rasterizer for SvgRasterizer {
    async fn rasterize(
        &self,
        page: &PageView<'_>,
        options: &RasterOptions,
    ) -> FolioResult<RasterImage> {
        let image = self.render(page, options)?;
        tracing::debug!("Rasterized page at {}x{}", image.width, image.height);
        Ok(image)
    }
}

/// Convert premultiplied pixmap data to straight-alpha RGBA.
fn to_raster_image(pixmap: &tiny_skia::Pixmap) -> RasterImage {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        rgba,
    }
}
