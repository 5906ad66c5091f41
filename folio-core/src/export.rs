//! Export orchestration.
//!
//! Exports run as "mutate → settle → rasterize → append page" against three
//! collaborators: a [`Rasterizer`] that captures the page, a [`PdfAssembler`]
//! that collects pages and a [`FileSink`] that receives the finished file.
//!
//! Every export holds an [`ExportGuard`] for its whole duration. The guard
//! hides overlay visuals, gates pointer input and, when dropped, restores the
//! selection, the grid and any transiently rewritten content, whichever way
//! the export ends.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::range::{RangeExpansion, LARGE_BATCH_THRESHOLD};
use crate::session::Confirm;
use crate::{Element, ElementId, ElementPatch, EditorSession, FolioError, FolioResult, Size};

/// File name for single-page exports.
pub const SINGLE_EXPORT_FILE_NAME: &str = "edited-document.pdf";

/// File name for batch exports.
pub const BATCH_EXPORT_FILE_NAME: &str = "batch-document.pdf";

/// Capture settings passed to the rasterizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Output pixels per canvas unit.
    pub scale: f32,
    /// Whether remote images may be fetched for the capture.
    pub allow_cross_origin: bool,
    /// Background fill as a CSS color.
    pub background: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            allow_cross_origin: true,
            background: "#ffffff".to_string(),
        }
    }
}

/// An RGBA8 pixel buffer (straight alpha, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

/// Read-only view of what the page currently shows.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    /// Virtual canvas size.
    pub canvas_size: Size,
    /// Elements in z-order.
    pub elements: &'a [Element],
    /// Selected element; drawn with an outline and, for images, a handle.
    pub selected: Option<&'a ElementId>,
    /// Whether the grid overlay is drawn.
    pub grid_visible: bool,
}

impl<'a> PageView<'a> {
    /// View of a session as it is right now.
    #[must_use]
    pub fn of(session: &'a EditorSession) -> Self {
        Self {
            canvas_size: session.config().canvas_size,
            elements: session.store.elements(),
            selected: session.store.selected_id(),
            grid_visible: session.grid_visible,
        }
    }
}

/// Captures the page as a raster image.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be captured.
    async fn rasterize(
        &self,
        page: &PageView<'_>,
        options: &RasterOptions,
    ) -> FolioResult<RasterImage>;
}

/// Collects raster pages into an A4 portrait PDF.
pub trait PdfAssembler {
    /// Append a page filled edge to edge by `image`. The first call creates
    /// the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be embedded.
    fn push_page(&mut self, image: &RasterImage) -> FolioResult<()>;

    /// Pages appended so far.
    fn page_count(&self) -> usize;

    /// Finish the document and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no pages were added or serialization fails.
    fn finish(&mut self) -> FolioResult<Vec<u8>>;

    /// Discard every page appended so far.
    fn reset(&mut self);
}

/// Receives finished export files.
pub trait FileSink: Send {
    /// Store `bytes` under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> FolioResult<()>;
}

/// Batch progress, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProgress {
    /// Page just appended.
    pub current: u64,
    /// Total pages in the batch.
    pub total: u64,
}

impl std::fmt::Display for ExportProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} / {}", self.current, self.total)
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// File name handed to the sink.
    pub file_name: String,
    /// Pages in the document.
    pub pages: usize,
    /// Size of the document in bytes.
    pub bytes: usize,
}

/// Export settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Pause before capturing a single page.
    pub single_settle: Duration,
    /// Pause after each batch mutation before capturing.
    pub batch_settle: Duration,
    /// Rasterizer settings.
    pub raster: RasterOptions,
    /// Output name for single exports.
    pub single_file_name: String,
    /// Output name for batch exports.
    pub batch_file_name: String,
    /// Batches longer than this need confirmation.
    pub confirm_threshold: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            single_settle: Duration::from_millis(100),
            batch_settle: Duration::from_millis(50),
            raster: RasterOptions::default(),
            single_file_name: SINGLE_EXPORT_FILE_NAME.to_string(),
            batch_file_name: BATCH_EXPORT_FILE_NAME.to_string(),
            confirm_threshold: LARGE_BATCH_THRESHOLD,
        }
    }
}

/// Scoped export state. Restores the session when dropped.
pub struct ExportGuard<'a> {
    session: &'a mut EditorSession,
    selection: Option<ElementId>,
    grid_visible: bool,
    original_content: Option<(ElementId, String)>,
}

impl<'a> ExportGuard<'a> {
    /// Snapshot the session, hide overlays and gate input.
    ///
    /// When `target` is given, its content is snapshotted too and may be
    /// rewritten through [`set_content`](Self::set_content).
    pub fn begin(session: &'a mut EditorSession, target: Option<&ElementId>) -> Self {
        let selection = session.store.selected_id().cloned();
        let grid_visible = session.grid_visible;
        let original_content = target.and_then(|id| {
            session
                .store
                .get(id)
                .map(|element| (id.clone(), element.content.clone()))
        });

        session.store.select(None);
        session.grid_visible = false;
        session.set_exporting(true);

        Self {
            session,
            selection,
            grid_visible,
            original_content,
        }
    }

    /// Current page view.
    #[must_use]
    pub fn page(&self) -> PageView<'_> {
        PageView::of(self.session)
    }

    /// Rewrite the snapshotted target's content.
    pub fn set_content(&mut self, content: &str) {
        if let Some((id, _)) = &self.original_content {
            self.session.store.update(id, &ElementPatch::content(content));
        }
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        if let Some((id, content)) = self.original_content.take() {
            self.session.store.update(&id, &ElementPatch::content(content));
        }
        self.session.store.select(self.selection.take());
        self.session.grid_visible = self.grid_visible;
        self.session.set_exporting(false);
        tracing::debug!("Restored pre-export state");
    }
}

async fn settle(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

fn export_failure(err: FolioError) -> FolioError {
    match err {
        FolioError::ExportFailure(_) => err,
        other => FolioError::ExportFailure(other.to_string()),
    }
}

/// Runs single and batch exports against a rasterizer.
#[derive(Debug, Clone)]
pub struct ExportOrchestrator<R> {
    rasterizer: R,
    config: ExportConfig,
}

impl<R: Rasterizer> ExportOrchestrator<R> {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(rasterizer: R, config: ExportConfig) -> Self {
        Self { rasterizer, config }
    }

    /// Export settings.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the page as a one-page PDF.
    ///
    /// Selection and grid are hidden for the capture and restored afterwards,
    /// whether or not the export succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Busy`] if an export is running, or
    /// [`FolioError::ExportFailure`] if capture, assembly or save fails.
    pub async fn export_single(
        &self,
        session: &mut EditorSession,
        assembler: &mut dyn PdfAssembler,
        sink: &mut dyn FileSink,
    ) -> FolioResult<ExportReport> {
        if session.is_exporting() {
            return Err(FolioError::Busy);
        }
        tracing::info!("Exporting page to {}", self.config.single_file_name);

        let guard = ExportGuard::begin(session, None);
        let outcome = self.run_single(&guard, assembler, sink).await;
        drop(guard);
        if outcome.is_err() {
            assembler.reset();
        }

        outcome
            .map_err(export_failure)
            .inspect(|report| tracing::info!("Exported {} bytes", report.bytes))
            .inspect_err(|e| tracing::warn!("Export aborted: {e}"))
    }

    async fn run_single(
        &self,
        guard: &ExportGuard<'_>,
        assembler: &mut dyn PdfAssembler,
        sink: &mut dyn FileSink,
    ) -> FolioResult<ExportReport> {
        settle(self.config.single_settle).await;
        let image = self
            .rasterizer
            .rasterize(&guard.page(), &self.config.raster)
            .await?;
        assembler.push_page(&image)?;
        let bytes = assembler.finish()?;
        sink.save(&self.config.single_file_name, &bytes)?;
        Ok(ExportReport {
            file_name: self.config.single_file_name.clone(),
            pages: 1,
            bytes: bytes.len(),
        })
    }

    /// Export one page per token of `pattern`, rewriting `target`'s content
    /// for each page, into a single PDF.
    ///
    /// The pattern, the target and (for large batches) the confirmation are
    /// all checked before anything is touched. Once pages are being produced
    /// any failure aborts the rest; the target's content, the selection and
    /// the grid are restored in every case and the file is saved only when
    /// all pages were produced.
    ///
    /// # Errors
    ///
    /// - [`FolioError::Busy`] if an export is already running
    /// - [`FolioError::Range`] if the pattern is rejected
    /// - [`FolioError::ElementNotFound`] / [`FolioError::NotText`] for a bad target
    /// - [`FolioError::Declined`] if a large batch is not confirmed
    /// - [`FolioError::ExportFailure`] if capture, assembly or save fails
    #[allow(clippy::too_many_arguments)]
    pub async fn export_batch(
        &self,
        session: &mut EditorSession,
        target: &ElementId,
        pattern: &str,
        confirm: &mut dyn Confirm,
        assembler: &mut dyn PdfAssembler,
        sink: &mut dyn FileSink,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> FolioResult<ExportReport> {
        if session.is_exporting() {
            return Err(FolioError::Busy);
        }

        let range = RangeExpansion::parse(pattern)?;

        let element = session
            .store
            .get(target)
            .ok_or_else(|| FolioError::ElementNotFound(target.to_string()))?;
        if !element.is_text() {
            return Err(FolioError::NotText(target.to_string()));
        }

        if range.len() > self.config.confirm_threshold
            && !confirm.confirm(&format!(
                "About to generate {} pages, this may take a while. Continue?",
                range.len()
            ))
        {
            return Err(FolioError::Declined(format!(
                "batch of {} pages",
                range.len()
            )));
        }

        tracing::info!(
            "Batch export of {} pages ({} .. {}) on {target}",
            range.len(),
            range.token(range.start),
            range.token(range.end)
        );

        let mut guard = ExportGuard::begin(session, Some(target));
        let outcome = self
            .run_batch(&mut guard, &range, assembler, progress)
            .await;
        drop(guard);

        let outcome = outcome.and_then(|()| {
            let pages = assembler.page_count();
            let bytes = assembler.finish()?;
            sink.save(&self.config.batch_file_name, &bytes)?;
            Ok(ExportReport {
                file_name: self.config.batch_file_name.clone(),
                pages,
                bytes: bytes.len(),
            })
        });
        if outcome.is_err() {
            assembler.reset();
        }

        outcome
            .map_err(export_failure)
            .inspect(|report| {
                tracing::info!("Batch exported {} pages, {} bytes", report.pages, report.bytes);
            })
            .inspect_err(|e| tracing::warn!("Batch export aborted: {e}"))
    }

    async fn run_batch(
        &self,
        guard: &mut ExportGuard<'_>,
        range: &RangeExpansion,
        assembler: &mut dyn PdfAssembler,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> FolioResult<()> {
        let total = range.len();
        for (index, content) in (1..).zip(range.iter()) {
            guard.set_content(&content);
            settle(self.config.batch_settle).await;

            let image = self
                .rasterizer
                .rasterize(&guard.page(), &self.config.raster)
                .await?;
            assembler.push_page(&image)?;

            progress(ExportProgress {
                current: index,
                total,
            });
        }
        Ok(())
    }
}
