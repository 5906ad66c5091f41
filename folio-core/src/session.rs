//! Editor session state.
//!
//! The session is the single owner of everything the page view reflects:
//! the element store, the gesture machine, overlay flags and the export gate.

use serde::{Deserialize, Serialize};

use crate::element::INITIAL_TEXT_CONTENT;
use crate::{
    CanvasViewport, Element, ElementId, ElementPatch, ElementStore, FolioError, FolioResult,
    InteractionMachine, Point, PointerEvent, PointerTarget, Size,
};

/// Yes/no gate for irreversible or expensive operations.
pub trait Confirm {
    /// Ask the user; `true` means proceed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Editor defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Fixed virtual canvas size.
    pub canvas_size: Size,
    /// Content of newly added text.
    pub initial_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: Size::a4(),
            initial_text: INITIAL_TEXT_CONTENT.to_string(),
        }
    }
}

impl EditorConfig {
    /// Where new text lands.
    #[must_use]
    pub fn text_origin(&self) -> Point {
        Point::new(
            self.canvas_size.width / 2.0 - 100.0,
            self.canvas_size.height / 2.0 - 20.0,
        )
    }

    /// Where new images land.
    #[must_use]
    pub fn image_origin(&self) -> Point {
        Point::new(
            self.canvas_size.width / 2.0 - 100.0,
            self.canvas_size.height / 2.0 - 100.0,
        )
    }
}

/// The complete editor state.
#[derive(Debug, Clone)]
pub struct EditorSession {
    /// Placed elements and selection.
    pub store: ElementStore,
    /// Gesture state.
    interaction: InteractionMachine,
    /// Current on-screen placement of the canvas.
    pub viewport: CanvasViewport,
    /// Whether the alignment grid overlay is shown.
    pub grid_visible: bool,
    /// Set while an export runs; pointer input is dropped.
    exporting: bool,
    config: EditorConfig,
}

impl EditorSession {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: ElementStore::new(),
            interaction: InteractionMachine::new(),
            viewport: CanvasViewport::new(config.canvas_size, Point::default(), config.canvas_size),
            grid_visible: false,
            exporting: false,
            config,
        }
    }

    /// Create a session around an existing store.
    #[must_use]
    pub fn with_store(store: ElementStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Gesture machine.
    #[must_use]
    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    /// Whether an export is running.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
    }

    /// Add a text element with default content at the default spot.
    pub fn add_text(&mut self) -> ElementId {
        let element = Element::text(self.config.initial_text.clone(), self.config.text_origin());
        self.store.add(element)
    }

    /// Add an image once its intrinsic size is known.
    pub fn add_image(&mut self, data_uri: impl Into<String>, intrinsic: Size) -> ElementId {
        let element = Element::image(data_uri, intrinsic, self.config.image_origin());
        self.store.add(element)
    }

    /// Patch an element.
    pub fn update(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        self.store.update(id, patch)
    }

    /// Delete an element; selection is always cleared.
    pub fn delete(&mut self, id: &ElementId) -> Option<Element> {
        self.store.remove(id)
    }

    /// Clear the page after asking.
    ///
    /// Returns `true` if the page was cleared.
    pub fn clear_with(&mut self, confirm: &mut dyn Confirm) -> bool {
        if !confirm.confirm("Clear the canvas? This cannot be undone.") {
            return false;
        }
        self.store.clear();
        true
    }

    /// Select an element or clear the selection. Ignored while exporting.
    pub fn select(&mut self, id: Option<ElementId>) {
        if self.exporting {
            tracing::debug!("Selection change ignored during export");
            return;
        }
        self.store.select(id);
    }

    /// Toggle the grid overlay.
    pub fn toggle_grid(&mut self) {
        self.grid_visible = !self.grid_visible;
    }

    /// Resolve what a screen point is over.
    ///
    /// The selected image's resize handle wins over element bodies.
    #[must_use]
    pub fn hit_test(&self, screen: Point) -> PointerTarget {
        let point = self.viewport.to_canvas(screen);
        let size = self.config.canvas_size;
        if point.x < 0.0 || point.y < 0.0 || point.x > size.width || point.y > size.height {
            return PointerTarget::Outside;
        }
        if let Some(selected) = self.store.selected_element() {
            if selected.handle_contains_point(point) {
                return PointerTarget::ResizeHandle(selected.id.clone());
            }
        }
        match self.store.element_at(point) {
            Some(element) => PointerTarget::Element(element.id.clone()),
            None => PointerTarget::Canvas,
        }
    }

    /// Feed a pointer event to the gesture machine.
    ///
    /// Returns `true` if the page changed. Input is dropped while exporting.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        if self.exporting {
            return false;
        }
        self.interaction
            .handle(&mut self.store, &self.viewport, event)
    }

    /// Load a project, replacing the page.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::LoadFailure`] and leaves the page untouched if
    /// the payload is rejected, or [`FolioError::Busy`] during an export.
    pub fn load_project(&mut self, payload: &str) -> FolioResult<()> {
        if self.exporting {
            return Err(FolioError::Busy);
        }
        self.store.deserialize(payload)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
