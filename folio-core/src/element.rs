//! Page elements - the text and image objects placed on the canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Size};

/// Default font size for new text elements.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Smallest allowed font size.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Largest allowed font size.
pub const MAX_FONT_SIZE: f32 = 400.0;

/// Default font stack for new text elements.
pub const DEFAULT_FONT_FAMILY: &str = "ui-sans-serif, system-ui, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif";

/// Placeholder content for newly added text.
pub const INITIAL_TEXT_CONTENT: &str = "点击编辑文本";

/// Rotations offered by the properties panel, in degrees.
pub const ROTATION_STEPS: [f32; 4] = [0.0, 90.0, 180.0, 270.0];

/// Initial width of a newly added image; height follows the aspect ratio.
pub const INITIAL_IMAGE_WIDTH: f32 = 200.0;

/// Padding around text content, in canvas units.
pub const TEXT_PADDING: f32 = 8.0;

/// Line height multiplier used for text layout.
pub const TEXT_LINE_HEIGHT: f32 = 1.1;

/// Radius of the image resize handle, centred on the bottom-right corner.
pub const RESIZE_HANDLE_RADIUS: f32 = 12.0;

/// Unique identifier for an element.
///
/// Identifiers are opaque strings. New elements get a random UUID; projects
/// written by other tools may carry any string and are loaded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant-specific attributes of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text label.
    #[serde(rename_all = "camelCase")]
    Text {
        /// Font size in canvas units.
        #[serde(default = "default_font_size")]
        font_size: f32,
        /// CSS-style font stack.
        #[serde(default = "default_font_family")]
        font_family: String,
        /// Text color; black when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },

    /// A raster image with a fixed aspect ratio.
    Image {
        /// Width in canvas units.
        width: f32,
        /// Height in canvas units.
        height: f32,
    },
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

/// A placed element.
///
/// Serialized flat, e.g.
/// `{"id":"..","type":"text","x":297,"y":541.5,"rotation":0,"content":"..","fontSize":16,"fontFamily":".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Variant attributes.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Top-left corner in canvas units.
    #[serde(flatten)]
    pub position: Point,
    /// Rotation in degrees about the element's centre.
    #[serde(default)]
    pub rotation: f32,
    /// Text for text elements, a data URI for images.
    pub content: String,
}

impl Element {
    /// Create a text element with default font settings.
    #[must_use]
    pub fn text(content: impl Into<String>, position: Point) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Text {
                font_size: DEFAULT_FONT_SIZE,
                font_family: DEFAULT_FONT_FAMILY.to_string(),
                color: None,
            },
            position,
            rotation: 0.0,
            content: content.into(),
        }
    }

    /// Create an image element sized from the source's intrinsic dimensions.
    ///
    /// The element starts [`INITIAL_IMAGE_WIDTH`] wide with the height chosen
    /// to keep the intrinsic aspect ratio. An intrinsic size without area
    /// yields a square.
    #[must_use]
    pub fn image(data_uri: impl Into<String>, intrinsic: Size, position: Point) -> Self {
        if !intrinsic.is_positive() {
            tracing::debug!(
                "Degenerate intrinsic size {}x{}, using a square",
                intrinsic.width,
                intrinsic.height
            );
        }
        let width = INITIAL_IMAGE_WIDTH;
        let height = width * intrinsic.aspect_ratio();
        Self {
            id: ElementId::new(),
            kind: ElementKind::Image { width, height },
            position,
            rotation: 0.0,
            content: data_uri.into(),
        }
    }

    /// Set the rotation.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the font size (text elements only).
    #[must_use]
    pub fn with_font_size(mut self, size: f32) -> Self {
        if let ElementKind::Text { font_size, .. } = &mut self.kind {
            *font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        }
        self
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    /// Whether this is an image element.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }

    /// Check the attributes a loaded element must satisfy: finite position
    /// and rotation, a positive image size, and a font size within
    /// [`MIN_FONT_SIZE`]..=[`MAX_FONT_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns a description of the first attribute out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.position.x.is_finite() && self.position.y.is_finite()) {
            return Err(format!("element {} has a non-finite position", self.id));
        }
        if !self.rotation.is_finite() {
            return Err(format!("element {} has a non-finite rotation", self.id));
        }
        match &self.kind {
            ElementKind::Image { width, height } if !Size::new(*width, *height).is_positive() => {
                Err(format!(
                    "image {} has a non-positive size {width}x{height}",
                    self.id
                ))
            }
            ElementKind::Text { font_size, .. }
                if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(font_size) =>
            {
                Err(format!(
                    "text {} has font size {font_size} outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}",
                    self.id
                ))
            }
            _ => Ok(()),
        }
    }

    /// Image size, `None` for text.
    #[must_use]
    pub fn image_size(&self) -> Option<Size> {
        match self.kind {
            ElementKind::Image { width, height } => Some(Size::new(width, height)),
            ElementKind::Text { .. } => None,
        }
    }

    /// Layout size of the element's box.
    ///
    /// Images report their exact size. Text boxes are estimated from the
    /// character count: half-width glyphs at 0.6 em, everything else at 1 em.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn box_size(&self) -> Size {
        match &self.kind {
            ElementKind::Image { width, height } => Size::new(*width, *height),
            ElementKind::Text { font_size, .. } => {
                let lines: Vec<&str> = self.content.split('\n').collect();
                let widest = lines
                    .iter()
                    .map(|line| {
                        line.chars()
                            .map(|c| if c.is_ascii() { 0.6 } else { 1.0 })
                            .sum::<f32>()
                    })
                    .fold(0.0_f32, f32::max);
                Size::new(
                    widest * font_size + TEXT_PADDING * 2.0,
                    lines.len() as f32 * font_size * TEXT_LINE_HEIGHT + TEXT_PADDING * 2.0,
                )
            }
        }
    }

    /// Centre of the element's box; rotation pivots here.
    #[must_use]
    pub fn center(&self) -> Point {
        let size = self.box_size();
        Point::new(
            self.position.x + size.width / 2.0,
            self.position.y + size.height / 2.0,
        )
    }

    /// Express a canvas point in the element's unrotated frame.
    fn unrotate(&self, point: Point) -> Point {
        if self.rotation == 0.0 {
            return point;
        }
        let c = self.center();
        let (sin, cos) = (-self.rotation).to_radians().sin_cos();
        let d = point - c;
        Point::new(c.x + d.x * cos - d.y * sin, c.y + d.x * sin + d.y * cos)
    }

    /// Check if a canvas point falls within the element's (rotated) box.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        let p = self.unrotate(point);
        let size = self.box_size();
        p.x >= self.position.x
            && p.x <= self.position.x + size.width
            && p.y >= self.position.y
            && p.y <= self.position.y + size.height
    }

    /// Check if a canvas point hits the resize handle. Only images have one.
    #[must_use]
    pub fn handle_contains_point(&self, point: Point) -> bool {
        let Some(size) = self.image_size() else {
            return false;
        };
        let p = self.unrotate(point);
        let dx = p.x - (self.position.x + size.width);
        let dy = p.y - (self.position.y + size.height);
        dx.hypot(dy) <= RESIZE_HANDLE_RADIUS
    }

    /// Merge a patch into this element.
    ///
    /// Attributes that do not apply to this element's kind are ignored.
    /// Returns `true` if anything changed.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        if let Some(x) = patch.x {
            self.position.x = x;
        }
        if let Some(y) = patch.y {
            self.position.y = y;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }

        match &mut self.kind {
            ElementKind::Text {
                font_size,
                font_family,
                color,
            } => {
                if let Some(size) = patch.font_size {
                    *font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                }
                if let Some(family) = &patch.font_family {
                    font_family.clone_from(family);
                }
                if let Some(c) = &patch.color {
                    *color = Some(c.clone());
                }
                if patch.width.is_some() || patch.height.is_some() {
                    tracing::debug!("Ignoring size patch on text element {}", self.id);
                }
            }
            ElementKind::Image { width, height } => {
                match patch.width {
                    Some(w) if w > 0.0 && w.is_finite() => *width = w,
                    Some(w) => tracing::debug!("Ignoring non-positive width {w} on {}", self.id),
                    None => {}
                }
                match patch.height {
                    Some(h) if h > 0.0 && h.is_finite() => *height = h,
                    Some(h) => tracing::debug!("Ignoring non-positive height {h} on {}", self.id),
                    None => {}
                }
                if patch.font_size.is_some() || patch.font_family.is_some() || patch.color.is_some()
                {
                    tracing::debug!("Ignoring font patch on image element {}", self.id);
                }
            }
        }

        *self != before
    }
}

/// A partial update for an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    /// New x position.
    pub x: Option<f32>,
    /// New y position.
    pub y: Option<f32>,
    /// New rotation in degrees.
    pub rotation: Option<f32>,
    /// New content.
    pub content: Option<String>,
    /// New font size (text only, clamped to 8-400).
    pub font_size: Option<f32>,
    /// New font family (text only).
    pub font_family: Option<String>,
    /// New color (text only).
    pub color: Option<String>,
    /// New width (image only, must be positive).
    pub width: Option<f32>,
    /// New height (image only, must be positive).
    pub height: Option<f32>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(at: Point) -> Self {
        Self {
            x: Some(at.x),
            y: Some(at.y),
            ..Self::default()
        }
    }

    /// Patch that resizes an image.
    #[must_use]
    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    /// Patch that replaces the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}
