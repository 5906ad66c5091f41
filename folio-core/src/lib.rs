//! # Folio Core
//!
//! Editor logic for a single A4 page of text and image elements.
//! Compiles to WASM so the same rules drive the browser front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              folio-core                     │
//! ├─────────────────────────────────────────────┤
//! │  Element Store   │  Interaction             │
//! │  - Text / Image  │  - Drag                  │
//! │  - Selection     │  - Proportional resize   │
//! │  - JSON project  │  - Screen → canvas units │
//! ├─────────────────────────────────────────────┤
//! │  Range Expander  │  Export Orchestrator     │
//! │  - start~end     │  - Restore guard         │
//! │  - Zero padding  │  - Rasterizer / PDF seam │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod range;
pub mod session;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use element::{Element, ElementId, ElementKind, ElementPatch};
pub use error::{FolioError, FolioResult};
pub use event::{PointerEvent, PointerPhase, PointerTarget};
pub use export::{
    ExportConfig, ExportGuard, ExportOrchestrator, ExportProgress, ExportReport, FileSink,
    PageView, PdfAssembler, RasterImage, RasterOptions, Rasterizer,
};
pub use geometry::{CanvasViewport, Point, Size, A4_HEIGHT, A4_HEIGHT_MM, A4_WIDTH, A4_WIDTH_MM};
pub use interaction::{Gesture, InteractionMachine};
pub use range::{expand_range, RangeError, RangeExpansion};
pub use session::{Confirm, EditorConfig, EditorSession};
pub use store::ElementStore;

/// Folio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
