//! # Folio Renderer
//!
//! Concrete export collaborators for folio-core.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ PageView │ → │ SVG page     │ → │ resvg pixmap  │ → │ printpdf A4   │
//! │          │   │ (page.rs)    │   │ (raster.rs)   │   │ (pdf.rs)      │
//! └──────────┘   └──────────────┘   └───────────────┘   └───────────────┘
//! ```
//!
//! Images enter through [`ingest`], which produces the data URIs and
//! intrinsic sizes the editor needs. Finished files leave through a
//! [`DirectorySink`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod ingest;
pub mod page;
pub mod pdf;
pub mod raster;
pub mod sink;

pub use error::{RenderError, RenderResult};
pub use ingest::{ingest_bytes, ingest_data_uri, ingest_file, IngestedImage};
pub use page::render_page_svg;
pub use pdf::A4PdfAssembler;
pub use raster::{FontDatabase, SvgRasterizer};
pub use sink::DirectorySink;
