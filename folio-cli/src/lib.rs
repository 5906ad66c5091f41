//! # Folio CLI
//!
//! Command-line host for the Folio editor core.
//!
//! ## Usage
//!
//! ```bash
//! folio new page.json
//! folio add-text page.json --text "No. 2-071" --font-size 24
//! folio add-image page.json logo.png
//! folio list page.json
//! folio export page.json --out-dir out/
//! folio batch page.json <text-id> "2-071~2-171" --out-dir out/
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Export settings derived from the arguments
//! - [`run`] - Executes one command against a project file

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use folio_core::{
    Confirm, EditorSession, Element, ElementId, ElementKind, ElementPatch, ElementStore,
    ExportConfig, ExportOrchestrator, ExportProgress, Point, RangeExpansion,
};
use folio_renderer::{ingest_file, A4PdfAssembler, DirectorySink, SvgRasterizer};

/// Command-line arguments for folio.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio")]
#[command(about = "Place text and images on an A4 page and export it to PDF")]
#[command(version)]
pub struct CliArgs {
    /// Output pixels per canvas unit when rasterizing pages
    #[arg(long, global = true, env = "FOLIO_SCALE", default_value = "2.0")]
    pub scale: f32,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Folio subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write an empty project
    New {
        /// Project file
        project: PathBuf,
    },

    /// Add a text element
    AddText {
        /// Project file
        project: PathBuf,
        /// Text content
        #[arg(long)]
        text: Option<String>,
        /// Left edge in canvas units
        #[arg(long)]
        x: Option<f32>,
        /// Top edge in canvas units
        #[arg(long)]
        y: Option<f32>,
        /// Font size
        #[arg(long)]
        font_size: Option<f32>,
        /// Font family
        #[arg(long)]
        font_family: Option<String>,
    },

    /// Add an image element from a file
    AddImage {
        /// Project file
        project: PathBuf,
        /// PNG, JPEG, GIF or WebP file
        image: PathBuf,
    },

    /// Change attributes of an element
    Set {
        /// Project file
        project: PathBuf,
        /// Element id
        id: String,
        /// Attributes to change
        #[command(flatten)]
        patch: PatchArgs,
    },

    /// Remove an element
    Remove {
        /// Project file
        project: PathBuf,
        /// Element id
        id: String,
    },

    /// Remove every element
    Clear {
        /// Project file
        project: PathBuf,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Print the elements in z-order
    List {
        /// Project file
        project: PathBuf,
    },

    /// Print the sequence a range pattern expands to
    Expand {
        /// Pattern such as 2-071~2-171
        pattern: String,
    },

    /// Export the page as a one-page PDF
    Export {
        /// Project file
        project: PathBuf,
        /// Output directory
        #[arg(long, env = "FOLIO_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Export one page per value of a range, rewriting a text element
    Batch {
        /// Project file
        project: PathBuf,
        /// Id of the text element to rewrite
        id: String,
        /// Pattern such as 2-071~2-171
        pattern: String,
        /// Output directory
        #[arg(long, env = "FOLIO_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Do not ask for confirmation on large batches
        #[arg(long)]
        yes: bool,
    },
}

/// Element attributes settable from the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct PatchArgs {
    /// Left edge in canvas units
    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<f32>,
    /// Top edge in canvas units
    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<f32>,
    /// Rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<f32>,
    /// Text content (text) or data URI (image)
    #[arg(long)]
    pub content: Option<String>,
    /// Font size (text only)
    #[arg(long)]
    pub font_size: Option<f32>,
    /// Font family (text only)
    #[arg(long)]
    pub font_family: Option<String>,
    /// Text color (text only)
    #[arg(long)]
    pub color: Option<String>,
    /// Width (image only)
    #[arg(long)]
    pub width: Option<f32>,
    /// Height (image only)
    #[arg(long)]
    pub height: Option<f32>,
}

impl From<PatchArgs> for ElementPatch {
    fn from(args: PatchArgs) -> Self {
        Self {
            x: args.x,
            y: args.y,
            rotation: args.rotation,
            content: args.content,
            font_size: args.font_size,
            font_family: args.font_family,
            color: args.color,
            width: args.width,
            height: args.height,
        }
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Export settings.
    pub export: ExportConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            export: ExportConfig::default(),
        }
    }
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        let mut export = ExportConfig::default();
        export.raster.scale = args.scale;
        Self { export }
    }
}

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Confirmation source for a command's `--yes` flag.
fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(|_: &str| true)
    } else {
        Box::new(StdinConfirm)
    }
}

fn load_session(project: &Path) -> anyhow::Result<EditorSession> {
    let mut store = ElementStore::new();
    store
        .load_from_path(project)
        .with_context(|| format!("cannot open project {}", project.display()))?;
    Ok(EditorSession::with_store(store))
}

fn save_session(session: &EditorSession, project: &Path) -> anyhow::Result<()> {
    session
        .store
        .save_to_path(project)
        .with_context(|| format!("cannot save project {}", project.display()))
}

/// Run one command, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error if the project cannot be read or written, the command's
/// arguments are rejected, or an export fails.
#[allow(clippy::too_many_lines)]
pub async fn run(args: CliArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = CliConfig::from(&args);
    let scale = config.export.raster.scale;
    if scale.is_nan() || scale <= 0.0 {
        bail!("scale must be positive, got {scale}");
    }

    match args.command {
        Command::New { project } => {
            save_session(&EditorSession::default(), &project)?;
            writeln!(out, "Created {}", project.display())?;
        }

        Command::AddText {
            project,
            text,
            x,
            y,
            font_size,
            font_family,
        } => {
            let mut session = load_session(&project)?;
            let id = session.add_text();
            let patch = ElementPatch {
                x,
                y,
                content: text,
                font_size,
                font_family,
                ..ElementPatch::default()
            };
            session.update(&id, &patch);
            save_session(&session, &project)?;
            writeln!(out, "{id}")?;
        }

        Command::AddImage { project, image } => {
            let ingested = ingest_file(&image)
                .with_context(|| format!("cannot read image {}", image.display()))?;
            let mut session = load_session(&project)?;
            let id = session.add_image(ingested.data_uri, ingested.intrinsic);
            save_session(&session, &project)?;
            writeln!(out, "{id}")?;
        }

        Command::Set { project, id, patch } => {
            let mut session = load_session(&project)?;
            let id = ElementId::from(id);
            if session.store.get(&id).is_none() {
                bail!("no element with id {id}");
            }
            if session.update(&id, &patch.into()) {
                save_session(&session, &project)?;
            } else {
                writeln!(out, "Nothing changed")?;
            }
        }

        Command::Remove { project, id } => {
            let mut session = load_session(&project)?;
            let id = ElementId::from(id);
            if session.delete(&id).is_none() {
                bail!("no element with id {id}");
            }
            save_session(&session, &project)?;
        }

        Command::Clear { project, yes } => {
            let mut session = load_session(&project)?;
            if session.clear_with(confirmer(yes).as_mut()) {
                save_session(&session, &project)?;
                writeln!(out, "Cleared {}", project.display())?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }

        Command::List { project } => {
            let session = load_session(&project)?;
            for element in session.store.elements() {
                writeln!(out, "{}", describe(element))?;
            }
        }

        Command::Expand { pattern } => {
            let range = RangeExpansion::parse(&pattern)?;
            if range.needs_confirmation() {
                tracing::warn!("{} pages would need confirmation to export", range.len());
            }
            for token in range.iter() {
                writeln!(out, "{token}")?;
            }
        }

        Command::Export { project, out_dir } => {
            let mut session = load_session(&project)?;
            let orchestrator = ExportOrchestrator::new(SvgRasterizer::new(), config.export);
            let mut assembler = A4PdfAssembler::default();
            let mut sink = DirectorySink::new(&out_dir);
            let report = orchestrator
                .export_single(&mut session, &mut assembler, &mut sink)
                .await?;
            writeln!(out, "{}", out_dir.join(&report.file_name).display())?;
        }

        Command::Batch {
            project,
            id,
            pattern,
            out_dir,
            yes,
        } => {
            let mut session = load_session(&project)?;
            let orchestrator = ExportOrchestrator::new(SvgRasterizer::new(), config.export);
            let mut assembler = A4PdfAssembler::default();
            let mut sink = DirectorySink::new(&out_dir);
            let mut confirm = confirmer(yes);
            let report = orchestrator
                .export_batch(
                    &mut session,
                    &ElementId::from(id),
                    &pattern,
                    confirm.as_mut(),
                    &mut assembler,
                    &mut sink,
                    &mut |progress: ExportProgress| tracing::info!("{progress}"),
                )
                .await?;
            writeln!(
                out,
                "{} ({} pages)",
                out_dir.join(&report.file_name).display(),
                report.pages
            )?;
        }
    }

    Ok(())
}

/// One `list` line: id, kind, position, rotation and a short summary.
fn describe(element: &Element) -> String {
    let summary = match &element.kind {
        ElementKind::Text { font_size, .. } => {
            let first_line = element.content.lines().next().unwrap_or_default();
            let mut preview: String = first_line.chars().take(40).collect();
            if preview.len() < element.content.len() {
                preview.push('…');
            }
            format!("text {font_size}px \"{preview}\"")
        }
        ElementKind::Image { width, height } => format!("image {width}x{height}"),
    };
    let Point { x, y } = element.position;
    format!(
        "{}\t({x}, {y})\t{}°\t{summary}",
        element.id, element.rotation
    )
}
