//! A4 PDF assembly with printpdf.

use folio_core::{FolioResult, PdfAssembler, RasterImage, A4_HEIGHT_MM, A4_WIDTH_MM};
use printpdf::{Image, ImageTransform, Mm, PdfDocument, PdfDocumentReference};

use crate::error::{RenderError, RenderResult};

/// Resolution the page images are embedded at.
const EMBED_DPI: f32 = 300.0;

const LAYER_NAME: &str = "Page";

/// Collects raster pages into an A4 portrait document, one image per page
/// stretched to the full page.
pub struct A4PdfAssembler {
    title: String,
    document: Option<PdfDocumentReference>,
    pages: usize,
}

impl A4PdfAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            document: None,
            pages: 0,
        }
    }

    fn append(&mut self, image: &RasterImage) -> RenderResult<()> {
        let pdf_image = to_pdf_image(image)?;

        let layer = if let Some(doc) = &self.document {
            let (page, layer) = doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page).get_layer(layer)
        } else {
            let (doc, page, layer) =
                PdfDocument::new(&self.title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER_NAME);
            let current = doc.get_page(page).get_layer(layer);
            self.document = Some(doc);
            current
        };

        pdf_image.add_to_layer(layer, fill_page_transform(image));
        self.pages += 1;
        Ok(())
    }

    fn take_bytes(&mut self) -> RenderResult<Vec<u8>> {
        let doc = self.document.take().ok_or(RenderError::NoPages)?;
        self.pages = 0;
        doc.save_to_bytes()
            .map_err(|e| RenderError::Pdf(format!("save failed: {e}")))
    }
}

impl Default for A4PdfAssembler {
    fn default() -> Self {
        Self::new("Folio Export")
    }
}

impl std::fmt::Debug for A4PdfAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A4PdfAssembler")
            .field("title", &self.title)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl PdfAssembler for A4PdfAssembler {
    fn push_page(&mut self, image: &RasterImage) -> FolioResult<()> {
        self.append(image)?;
        tracing::debug!("Appended PDF page {}", self.pages);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finish(&mut self) -> FolioResult<Vec<u8>> {
        Ok(self.take_bytes()?)
    }

    fn reset(&mut self) {
        if self.document.take().is_some() {
            tracing::debug!("Discarded {} pending PDF pages", self.pages);
        }
        self.pages = 0;
    }
}

/// Flatten straight-alpha RGBA onto white and wrap it for printpdf.
fn to_pdf_image(image: &RasterImage) -> RenderResult<Image> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
        return Err(RenderError::Pdf(format!(
            "malformed {}x{} page image ({} bytes)",
            image.width,
            image.height,
            image.rgba.len()
        )));
    }

    let mut rgb = Vec::with_capacity(expected / 4 * 3);
    for px in image.rgba.chunks_exact(4) {
        let alpha = u16::from(px[3]);
        for &channel in &px[..3] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(u8::try_from(blended).unwrap_or(u8::MAX));
        }
    }

    // Build through printpdf's bundled image crate for compatibility
    let buffer = printpdf::image_crate::RgbImage::from_raw(image.width, image.height, rgb)
        .ok_or_else(|| RenderError::Pdf("page buffer size mismatch".to_string()))?;
    let dynamic_image = printpdf::image_crate::DynamicImage::ImageRgb8(buffer);
    Ok(Image::from_dynamic_image(&dynamic_image))
}

/// Scale an image at [`EMBED_DPI`] so it covers the whole A4 page.
#[allow(clippy::cast_precision_loss)]
fn fill_page_transform(image: &RasterImage) -> ImageTransform {
    let natural_w_mm = image.width as f32 / EMBED_DPI * 25.4;
    let natural_h_mm = image.height as f32 / EMBED_DPI * 25.4;
    ImageTransform {
        translate_x: Some(Mm(0.0)),
        translate_y: Some(Mm(0.0)),
        scale_x: Some(A4_WIDTH_MM / natural_w_mm),
        scale_y: Some(A4_HEIGHT_MM / natural_h_mm),
        dpi: Some(EMBED_DPI),
        ..Default::default()
    }
}
