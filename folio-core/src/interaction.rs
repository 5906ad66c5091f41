//! Drag and resize gesture state machine.
//!
//! ```text
//!            down on body                      down on handle (image)
//!   ┌──────┐ ───────────────▶ ┌──────────┐   ┌──────┐ ─────────────▶ ┌──────────┐
//!   │ Idle │                  │ Dragging │   │ Idle │                │ Resizing │
//!   └──────┘ ◀─────────────── └──────────┘   └──────┘ ◀───────────── └──────────┘
//!               up (anywhere)                            up (anywhere)
//! ```
//!
//! Positions are tracked in canvas units. Screen deltas are rescaled by
//! `virtual / rendered` so a gesture behaves the same at any zoom.

use serde::{Deserialize, Serialize};

use crate::{
    CanvasViewport, ElementId, ElementPatch, ElementStore, Point, PointerEvent, PointerPhase,
    PointerTarget, Size,
};

/// Images cannot be resized narrower than this.
pub const MIN_IMAGE_WIDTH: f32 = 20.0;

/// The active gesture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving an element.
    Dragging {
        /// Element being moved.
        id: ElementId,
        /// Pointer position at gesture start, in canvas units.
        anchor: Point,
        /// Element position at gesture start.
        origin: Point,
    },
    /// Proportionally resizing an image.
    Resizing {
        /// Element being resized.
        id: ElementId,
        /// Pointer position at gesture start, in screen units.
        anchor: Point,
        /// Element size at gesture start.
        start_size: Size,
    },
}

/// Owns the gesture state and applies pointer events to a store.
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    gesture: Gesture,
}

impl InteractionMachine {
    /// Create an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture.
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether no gesture is active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Apply a pointer event.
    ///
    /// Returns `true` if the store's elements or selection changed.
    pub fn handle(
        &mut self,
        store: &mut ElementStore,
        viewport: &CanvasViewport,
        event: &PointerEvent,
    ) -> bool {
        match event.phase {
            PointerPhase::Down => self.pointer_down(store, viewport, event),
            PointerPhase::Move => self.pointer_move(store, viewport, event.position),
            PointerPhase::Up => {
                self.pointer_up();
                false
            }
        }
    }

    fn pointer_down(
        &mut self,
        store: &mut ElementStore,
        viewport: &CanvasViewport,
        event: &PointerEvent,
    ) -> bool {
        // Clicking empty canvas only deselects; an active gesture keeps going.
        if event.target == PointerTarget::Canvas {
            let changed = store.selected_id().is_some();
            store.select(None);
            return changed;
        }

        if !self.is_idle() {
            tracing::debug!("Pointer down during {:?} ignored", self.gesture);
            return false;
        }

        match &event.target {
            PointerTarget::Element(id) => {
                store.select(Some(id.clone()));
                if let Some(element) = store.get(id) {
                    self.gesture = Gesture::Dragging {
                        id: id.clone(),
                        anchor: viewport.to_canvas(event.position),
                        origin: element.position,
                    };
                    tracing::debug!("Drag started on {id}");
                }
                true
            }
            PointerTarget::ResizeHandle(id) => {
                let mut changed = false;
                if store.selected_id() != Some(id) {
                    store.select(Some(id.clone()));
                    changed = true;
                }
                if let Some(start_size) = store.get(id).and_then(crate::Element::image_size) {
                    self.gesture = Gesture::Resizing {
                        id: id.clone(),
                        anchor: event.position,
                        start_size,
                    };
                    tracing::debug!("Resize started on {id}");
                }
                changed
            }
            PointerTarget::Canvas | PointerTarget::Outside => false,
        }
    }

    fn pointer_move(
        &mut self,
        store: &mut ElementStore,
        viewport: &CanvasViewport,
        screen: Point,
    ) -> bool {
        match &self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { id, anchor, origin } => {
                let delta = viewport.to_canvas(screen) - *anchor;
                store.update(id, &ElementPatch::position(*origin + delta))
            }
            Gesture::Resizing {
                id,
                anchor,
                start_size,
            } => {
                let delta = viewport.delta_to_canvas(screen - *anchor);
                let width = (start_size.width + delta.x).max(MIN_IMAGE_WIDTH);
                let height = width * start_size.aspect_ratio();
                store.update(id, &ElementPatch::size(Size::new(width, height)))
            }
        }
    }

    /// End any gesture. Release is honoured wherever the pointer is.
    pub fn pointer_up(&mut self) {
        if !self.is_idle() {
            tracing::debug!("Gesture ended");
        }
        self.gesture = Gesture::Idle;
    }
}
