//! WebAssembly bindings for folio-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! The page DOM forwards raw mouse coordinates; hit testing, gestures and the
//! project format all stay on the Rust side.

use wasm_bindgen::prelude::*;

use crate::{
    CanvasViewport, EditorSession, ElementId, ElementPatch, Point, PointerEvent, PointerPhase,
    RangeExpansion, Size,
};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an empty editor.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: EditorSession::default(),
        }
    }

    /// Add a default text element; returns its id.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self) -> String {
        self.session.add_text().to_string()
    }

    /// Add an image once the browser has decoded its intrinsic size.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, data_uri: String, width: f32, height: f32) -> String {
        self.session
            .add_image(data_uri, Size::new(width, height))
            .to_string()
    }

    /// Apply a JSON patch such as `{"fontSize": 24}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch is not valid JSON.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<bool, String> {
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        Ok(self.session.update(&ElementId::from(id), &patch))
    }

    /// Delete an element.
    #[wasm_bindgen(js_name = deleteElement)]
    pub fn delete_element(&mut self, id: &str) -> bool {
        self.session.delete(&ElementId::from(id)).is_some()
    }

    /// Clear the page. The caller has already asked the user.
    #[wasm_bindgen(js_name = clearConfirmed)]
    pub fn clear_confirmed(&mut self) {
        self.session.clear_with(&mut |_: &str| true);
    }

    /// Select an element, or clear the selection with `undefined`.
    pub fn select(&mut self, id: Option<String>) {
        self.session.select(id.map(ElementId::from));
    }

    /// Currently selected id.
    #[wasm_bindgen(js_name = selectedId)]
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.session.store.selected_id().map(ToString::to_string)
    }

    /// Toggle the grid overlay.
    #[wasm_bindgen(js_name = toggleGrid)]
    pub fn toggle_grid(&mut self) -> bool {
        self.session.toggle_grid();
        self.session.grid_visible
    }

    /// Report where the canvas is drawn (from `getBoundingClientRect`).
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.session.viewport = CanvasViewport::new(
            self.session.config().canvas_size,
            Point::new(left, top),
            Size::new(width, height),
        );
    }

    /// Mouse down at client coordinates. Returns `true` if the page changed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        let position = Point::new(x, y);
        let target = self.session.hit_test(position);
        self.session
            .handle_pointer(&PointerEvent::new(PointerPhase::Down, position, target))
    }

    /// Mouse move at client coordinates. Returns `true` if the page changed.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session.handle_pointer(&PointerEvent::moved(x, y))
    }

    /// Mouse up anywhere in the window.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.session.handle_pointer(&PointerEvent::up(x, y));
    }

    /// Elements as a JSON project array.
    #[wasm_bindgen(js_name = getProjectJson)]
    #[must_use]
    pub fn get_project_json(&self) -> String {
        self.session.store.serialize().unwrap_or_else(|_| "[]".to_string())
    }

    /// Replace the page from a JSON project array.
    ///
    /// # Errors
    ///
    /// Returns an error string and keeps the page if the payload is rejected.
    #[wasm_bindgen(js_name = loadProjectJson)]
    pub fn load_project_json(&mut self, json: &str) -> Result<(), String> {
        self.session.load_project(json).map_err(|e| e.to_string())
    }

    /// Expand a batch range pattern into its tokens.
    ///
    /// # Errors
    ///
    /// Returns an error string describing why the pattern was rejected.
    #[wasm_bindgen(js_name = expandRange)]
    pub fn expand_range(pattern: &str) -> Result<js_sys::Array, String> {
        let range = RangeExpansion::parse(pattern).map_err(|e| e.to_string())?;
        Ok(range.iter().map(JsValue::from).collect())
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}
