//! Integration tests for the export pipeline (folio-renderer).
//!
//! Drives the core orchestrator with the real rasterizer, PDF assembler and
//! directory sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use folio_core::{
    EditorSession, ExportConfig, ExportOrchestrator, ExportProgress, FolioError, FolioResult,
    PageView, PdfAssembler, RasterImage, RasterOptions, Rasterizer, Size,
};
use folio_renderer::{ingest_data_uri, A4PdfAssembler, DirectorySink, SvgRasterizer};

const RED_PIXEL_PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// Real rasterizer that starts failing after a number of captures.
struct FlakyRasterizer {
    inner: SvgRasterizer,
    remaining: AtomicUsize,
}

#[async_trait]
impl Rasterizer for FlakyRasterizer {
    async fn rasterize(
        &self,
        page: &PageView<'_>,
        options: &RasterOptions,
    ) -> FolioResult<RasterImage> {
        if self.remaining.load(Ordering::SeqCst) == 0 {
            return Err(FolioError::ExportFailure("capture failed".to_string()));
        }
        self.remaining.fetch_sub(1, Ordering::SeqCst);
        self.inner.rasterize(page, options).await
    }
}

/// Orchestrator with no settle delay and a small raster scale.
fn orchestrator() -> ExportOrchestrator<SvgRasterizer> {
    with_rasterizer(SvgRasterizer::with_fontdb(empty_fontdb()))
}

fn with_rasterizer<R: Rasterizer>(rasterizer: R) -> ExportOrchestrator<R> {
    ExportOrchestrator::new(
        rasterizer,
        ExportConfig {
            single_settle: Duration::ZERO,
            batch_settle: Duration::ZERO,
            raster: RasterOptions {
                scale: 0.25,
                ..RasterOptions::default()
            },
            ..ExportConfig::default()
        },
    )
}

/// Empty font database; text is laid out but not drawn.
fn empty_fontdb() -> folio_renderer::FontDatabase {
    folio_renderer::FontDatabase::new()
}

fn session_with_content() -> EditorSession {
    let mut session = EditorSession::default();
    let image = ingest_data_uri(RED_PIXEL_PNG_URI).expect("ingest");
    session.add_image(image.data_uri, image.intrinsic);
    session.add_text();
    session.grid_visible = true;
    session
}

// ==========================================================================
// Single export
// ==========================================================================

#[tokio::test]
async fn single_export_writes_pdf() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_content();
    let selected = session.store.selected_id().cloned();

    let mut assembler = A4PdfAssembler::default();
    let mut sink = DirectorySink::new(dir.path());
    let report = orchestrator()
        .export_single(&mut session, &mut assembler, &mut sink)
        .await
        .expect("export");

    assert_eq!(report.file_name, "edited-document.pdf");
    assert_eq!(report.pages, 1);

    let pdf = std::fs::read(dir.path().join("edited-document.pdf")).expect("read");
    assert_eq!(&pdf[0..5], b"%PDF-");
    assert_eq!(pdf.len(), report.bytes);

    assert_eq!(session.store.selected_id().cloned(), selected);
    assert!(session.grid_visible);
    assert!(!session.is_exporting());
}

// ==========================================================================
// Batch export
// ==========================================================================

#[tokio::test]
async fn batch_export_writes_one_page_per_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_content();
    let target = session.store.selected_id().cloned().expect("text selected");

    let mut assembler = A4PdfAssembler::default();
    let mut sink = DirectorySink::new(dir.path());
    let mut seen = Vec::new();
    let report = orchestrator()
        .export_batch(
            &mut session,
            &target,
            "2-071~2-073",
            &mut |_: &str| true,
            &mut assembler,
            &mut sink,
            &mut |p: ExportProgress| seen.push(p.to_string()),
        )
        .await
        .expect("batch");

    assert_eq!(report.file_name, "batch-document.pdf");
    assert_eq!(report.pages, 3);
    assert_eq!(seen, ["page 1 / 3", "page 2 / 3", "page 3 / 3"]);
    assert!(dir.path().join("batch-document.pdf").exists());

    let text = session.store.get(&target).expect("target");
    assert_eq!(text.content, folio_core::element::INITIAL_TEXT_CONTENT);
    assert_eq!(session.store.selected_id(), Some(&target));
}

#[tokio::test]
async fn batch_on_image_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = EditorSession::default();
    let image = session.add_image(RED_PIXEL_PNG_URI, Size::new(1.0, 1.0));

    let mut assembler = A4PdfAssembler::default();
    let mut sink = DirectorySink::new(dir.path());
    let result = orchestrator()
        .export_batch(
            &mut session,
            &image,
            "1~2",
            &mut |_: &str| true,
            &mut assembler,
            &mut sink,
            &mut |_: ExportProgress| {},
        )
        .await;

    assert!(matches!(result, Err(FolioError::NotText(_))));
    assert_eq!(assembler.page_count(), 0);
    assert!(sink.saved().is_empty());
}

// ==========================================================================
// Failure paths
// ==========================================================================

#[tokio::test]
async fn unwritable_sink_restores_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").expect("write");

    let mut session = session_with_content();
    let selected = session.store.selected_id().cloned();

    let mut assembler = A4PdfAssembler::default();
    let mut sink = DirectorySink::new(blocker.join("out"));
    let result = orchestrator()
        .export_single(&mut session, &mut assembler, &mut sink)
        .await;

    assert!(matches!(result, Err(FolioError::ExportFailure(_))));
    assert_eq!(session.store.selected_id().cloned(), selected);
    assert!(session.grid_visible);
    assert!(!session.is_exporting());
}

#[tokio::test]
async fn failed_batch_leaves_no_pages_for_the_next_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_content();
    let target = session.store.selected_id().cloned().expect("text selected");
    let flaky = with_rasterizer(FlakyRasterizer {
        inner: SvgRasterizer::with_fontdb(empty_fontdb()),
        remaining: AtomicUsize::new(2),
    });

    let mut assembler = A4PdfAssembler::default();
    let mut sink = DirectorySink::new(dir.path());
    let result = flaky
        .export_batch(
            &mut session,
            &target,
            "1~5",
            &mut |_: &str| true,
            &mut assembler,
            &mut sink,
            &mut |_: ExportProgress| {},
        )
        .await;

    assert!(matches!(result, Err(FolioError::ExportFailure(_))));
    assert_eq!(assembler.page_count(), 0);
    assert!(sink.saved().is_empty());

    let report = orchestrator()
        .export_single(&mut session, &mut assembler, &mut sink)
        .await
        .expect("export");
    assert_eq!(report.pages, 1);
    assert_eq!(assembler.page_count(), 0);
}
