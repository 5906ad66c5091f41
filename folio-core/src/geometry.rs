//! Canvas geometry: points, sizes and the screen-to-canvas mapping.

use serde::{Deserialize, Serialize};

/// A4 page width in canvas units (210 mm at 96 DPI).
pub const A4_WIDTH: f32 = 794.0;

/// A4 page height in canvas units (297 mm at 96 DPI).
pub const A4_HEIGHT: f32 = 1123.0;

/// A4 page width in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 page height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The fixed A4 virtual canvas size.
    #[must_use]
    pub const fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    /// Whether both sides are finite and greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Height divided by width, or 1 for a degenerate size.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_positive() {
            self.height / self.width
        } else {
            1.0
        }
    }
}

/// Where the canvas is currently drawn on screen.
///
/// The canvas has a fixed virtual size; the on-screen rectangle may be scaled
/// by zoom or layout. Pointer positions arrive in screen space and are mapped
/// back into canvas units so gestures are resolution independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasViewport {
    /// Fixed virtual size of the canvas.
    pub virtual_size: Size,
    /// Top-left corner of the rendered canvas in screen space.
    pub rendered_origin: Point,
    /// Rendered size of the canvas in screen space.
    pub rendered_size: Size,
}

impl CanvasViewport {
    /// Viewport for a canvas rendered at `origin` with `rendered_size`.
    #[must_use]
    pub const fn new(virtual_size: Size, rendered_origin: Point, rendered_size: Size) -> Self {
        Self {
            virtual_size,
            rendered_origin,
            rendered_size,
        }
    }

    /// An A4 canvas drawn 1:1 at the screen origin.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Size::a4(), Point::new(0.0, 0.0), Size::a4())
    }

    /// Horizontal and vertical screen-to-canvas scale factors.
    #[must_use]
    pub fn scale(&self) -> (f32, f32) {
        (
            self.virtual_size.width / self.rendered_size.width,
            self.virtual_size.height / self.rendered_size.height,
        )
    }

    /// Map a screen-space point into canvas units.
    #[must_use]
    pub fn to_canvas(&self, screen: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            (screen.x - self.rendered_origin.x) * sx,
            (screen.y - self.rendered_origin.y) * sy,
        )
    }

    /// Scale a screen-space delta into canvas units.
    #[must_use]
    pub fn delta_to_canvas(&self, delta: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(delta.x * sx, delta.y * sy)
    }
}

impl Default for CanvasViewport {
    fn default() -> Self {
        Self::identity()
    }
}
