//! Pointer events for direct manipulation.

use serde::{Deserialize, Serialize};

use crate::{ElementId, Point};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// What the pointer was over when the event fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PointerTarget {
    /// The body of an element.
    Element(ElementId),
    /// The resize handle of an (image) element.
    ResizeHandle(ElementId),
    /// Empty canvas area.
    Canvas,
    /// Anywhere outside the canvas.
    Outside,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Pointer position in screen space.
    pub position: Point,
    /// Hit target under the pointer.
    pub target: PointerTarget,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, position: Point, target: PointerTarget) -> Self {
        Self {
            phase,
            position,
            target,
        }
    }

    /// Pointer pressed over `target`.
    #[must_use]
    pub fn down(x: f32, y: f32, target: PointerTarget) -> Self {
        Self::new(PointerPhase::Down, Point::new(x, y), target)
    }

    /// Pointer moved. Move handlers ignore the target.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, Point::new(x, y), PointerTarget::Outside)
    }

    /// Pointer released. Release handlers ignore the target.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, Point::new(x, y), PointerTarget::Outside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_event_json_shape() {
        let event = PointerEvent::down(1.0, 2.0, PointerTarget::ResizeHandle("a".into()));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["phase"], "down");
        assert_eq!(json["target"]["type"], "resize_handle");
        assert_eq!(json["target"]["id"], "a");

        let canvas: PointerTarget =
            serde_json::from_str(r#"{"type":"canvas"}"#).expect("unit variant");
        assert_eq!(canvas, PointerTarget::Canvas);
    }
}
