//! The element store: an ordered element list plus the current selection.
//!
//! Z-order equals insertion order; later elements draw above earlier ones.

use std::path::Path;

use crate::{Element, ElementId, ElementPatch, FolioError, FolioResult, Point};

/// Default file name for saved projects.
pub const PROJECT_FILE_NAME: &str = "pdf-project-config.json";

/// Flat, ordered collection of elements with at most one selection.
///
/// # Example
///
/// ```
/// use folio_core::{Element, ElementStore, Point};
///
/// let mut store = ElementStore::new();
/// let id = store.add(Element::text("Hello", Point::new(10.0, 10.0)));
/// assert_eq!(store.selected_id(), Some(&id));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStore {
    elements: Vec<Element>,
    selected: Option<ElementId>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and select it.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id.clone();
        tracing::debug!("Adding element {id}");
        self.elements.push(element);
        self.selected = Some(id.clone());
        id
    }

    /// Merge `patch` into the element with `id`.
    ///
    /// Returns `false` when no such element exists or nothing changed.
    pub fn update(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        match self.get_mut(id) {
            Some(element) => element.apply(patch),
            None => {
                tracing::debug!("Update for missing element {id} ignored");
                false
            }
        }
    }

    /// Remove the element with `id`.
    ///
    /// Selection is cleared whether or not the removed element was the
    /// selected one.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.selected = None;
        let index = self.position_of(id)?;
        tracing::debug!("Removing element {id}");
        Some(self.elements.remove(index))
    }

    /// Remove every element and clear the selection.
    ///
    /// Irreversible; interactive callers go through
    /// [`EditorSession::clear_with`](crate::EditorSession::clear_with) which
    /// asks for confirmation first.
    pub fn clear(&mut self) {
        tracing::debug!("Clearing {} elements", self.elements.len());
        self.elements.clear();
        self.selected = None;
    }

    /// Set or clear the selection.
    ///
    /// Unknown ids are accepted; [`selected_element`](Self::selected_element)
    /// then resolves to `None`.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    /// The selected id, if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element, if the selection resolves.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Index of the element in z-order.
    #[must_use]
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// All elements, bottom to top.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Topmost element containing the canvas point.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.elements.iter().rev().find(|e| e.contains_point(point))
    }

    /// Serialize all elements as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> FolioResult<String> {
        serde_json::to_string(&self.elements).map_err(FolioError::Serialization)
    }

    /// Replace the store contents from a JSON array of elements.
    ///
    /// The store is left untouched unless the payload parses, is an array,
    /// every record is a valid element with in-range attributes, and ids are
    /// unique. A successful load
    /// clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::LoadFailure`] describing the first problem found.
    pub fn deserialize(&mut self, payload: &str) -> FolioResult<()> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| FolioError::LoadFailure(format!("unparsable project: {e}")))?;

        if !value.is_array() {
            return Err(FolioError::LoadFailure(
                "project must be a JSON array of elements".to_string(),
            ));
        }

        let elements: Vec<Element> = serde_json::from_value(value)
            .map_err(|e| FolioError::LoadFailure(format!("invalid element record: {e}")))?;

        if let Some(message) = elements.iter().find_map(|e| e.validate().err()) {
            return Err(FolioError::LoadFailure(message));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = elements.iter().find(|e| !seen.insert(&e.id)) {
            return Err(FolioError::LoadFailure(format!(
                "duplicate element id: {}",
                dup.id
            )));
        }

        tracing::debug!("Loaded {} elements", elements.len());
        self.elements = elements;
        self.selected = None;
        Ok(())
    }

    /// Write the project to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> FolioResult<()> {
        let json = self.serialize()?;
        std::fs::write(path.as_ref(), json)?;
        tracing::info!("Saved project to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a project from a JSON file, replacing the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Io`] if the file cannot be read, or
    /// [`FolioError::LoadFailure`] if its contents are rejected.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> FolioResult<()> {
        let payload = std::fs::read_to_string(path.as_ref())?;
        self.deserialize(&payload).inspect_err(|e| {
            tracing::warn!("Rejected project {}: {e}", path.as_ref().display());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;

    fn text(content: &str) -> Element {
        Element::text(content, Point::new(0.0, 0.0))
    }

    #[test]
    fn add_selects_new_element() {
        let mut store = ElementStore::new();
        let a = store.add(text("a"));
        let b = store.add(text("b"));
        assert_eq!(store.selected_id(), Some(&b));
        assert_eq!(store.position_of(&a), Some(0));
        assert_eq!(store.position_of(&b), Some(1));
    }

    #[test]
    fn update_missing_is_noop() {
        let mut store = ElementStore::new();
        store.add(text("a"));
        let before = store.clone();
        assert!(!store.update(&ElementId::from("nope"), &ElementPatch::content("x")));
        assert_eq!(store, before);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut store = ElementStore::new();
        let id = store.add(text("a").with_rotation(90.0));
        assert!(store.update(&id, &ElementPatch::position(Point::new(5.0, 6.0))));
        let element = store.get(&id).expect("element");
        assert_eq!(element.position, Point::new(5.0, 6.0));
        assert!((element.rotation - 90.0).abs() < f32::EPSILON);
        assert_eq!(element.content, "a");
    }

    #[test]
    fn removing_any_element_clears_selection() {
        let mut store = ElementStore::new();
        let a = store.add(text("a"));
        let b = store.add(text("b"));
        assert_eq!(store.selected_id(), Some(&b));

        store.remove(&a);
        assert_eq!(store.selected_id(), None);
        assert_eq!(store.len(), 1);

        store.select(Some(b.clone()));
        store.remove(&b);
        assert_eq!(store.selected_id(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn selecting_unknown_id_resolves_to_nothing() {
        let mut store = ElementStore::new();
        store.add(text("a"));
        store.select(Some(ElementId::from("ghost")));
        assert!(store.selected_id().is_some());
        assert!(store.selected_element().is_none());
    }

    #[test]
    fn load_rejects_degenerate_records() {
        let mut store = ElementStore::new();
        let id = store.add(text("keep"));
        let before = store.clone();

        let zero_width = r#"[{"id":"a","type":"image","x":0,"y":0,"rotation":0,"content":"data:,","width":0,"height":10}]"#;
        let tiny_font = r#"[{"id":"b","type":"text","x":0,"y":0,"rotation":0,"content":"t","fontSize":1,"fontFamily":"serif"}]"#;
        for payload in [zero_width, tiny_font] {
            let err = store.deserialize(payload).expect_err("rejected");
            assert!(matches!(err, FolioError::LoadFailure(_)));
        }

        assert_eq!(store, before);
        assert_eq!(store.selected_id(), Some(&id));
    }

    #[test]
    fn element_at_prefers_topmost() {
        let mut store = ElementStore::new();
        let square = Size::new(1.0, 1.0);
        let below = store.add(Element::image("data:,", square, Point::new(0.0, 0.0)));
        let above = store.add(Element::image("data:,", square, Point::new(50.0, 50.0)));
        assert_eq!(
            store.element_at(Point::new(100.0, 100.0)).map(|e| &e.id),
            Some(&above)
        );
        assert_eq!(
            store.element_at(Point::new(10.0, 10.0)).map(|e| &e.id),
            Some(&below)
        );
        assert!(store.element_at(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn serialize_round_trip() {
        let mut store = ElementStore::new();
        store.add(text("hello").with_font_size(42.0).with_rotation(180.0));
        store.add(Element::image(
            "data:image/png;base64,AAAA",
            Size::new(3.0, 7.0),
            Point::new(12.5, 99.25),
        ));

        let json = store.serialize().expect("serialize");
        let mut loaded = ElementStore::new();
        loaded.deserialize(&json).expect("deserialize");
        assert_eq!(loaded.elements(), store.elements());
        assert_eq!(loaded.selected_id(), None);
    }

    #[test]
    fn deserialize_rejects_non_array_and_keeps_store() {
        let mut store = ElementStore::new();
        let id = store.add(text("keep"));
        let before = store.clone();

        for payload in [r#"{"elements":[]}"#, "not json", r#"[{"id":"x"}]"#] {
            let err = store.deserialize(payload).expect_err("should reject");
            assert!(matches!(err, FolioError::LoadFailure(_)));
            assert_eq!(store, before);
        }
        assert_eq!(store.selected_id(), Some(&id));
    }

    #[test]
    fn deserialize_rejects_duplicate_ids() {
        let payload = r#"[
            {"id":"a","type":"text","x":0,"y":0,"rotation":0,"content":"1"},
            {"id":"a","type":"text","x":0,"y":0,"rotation":0,"content":"2"}
        ]"#;
        let mut store = ElementStore::new();
        let err = store.deserialize(payload).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate"));
        assert!(store.is_empty());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(PROJECT_FILE_NAME);

        let mut store = ElementStore::new();
        store.add(text("on disk"));
        store.save_to_path(&path).expect("save");

        let mut loaded = ElementStore::new();
        loaded.load_from_path(&path).expect("load");
        assert_eq!(loaded.elements(), store.elements());
    }
}
