//! Callback Annotation Map
//!
//! Insertion-ordered mapping from element identifier to a host-supplied
//! annotation value. Host script may pre-populate it before binding; if it is
//! still empty when a bind pass begins, it is filled automatically with every
//! identified element mapped to null. Once non-empty it is never repopulated
//! by the core.

use indexmap::IndexMap;
use serde_json::Value;

use crate::element::Element;

/// Per-identifier annotation values, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct AnnotationMap {
    entries: IndexMap<String, Value>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Associate an annotation value with an identifier.
    ///
    /// Identifiers inserted here need not exist in the current tree; unknown
    /// ones are skipped silently during binding.
    pub fn insert(&mut self, identifier: impl Into<String>, value: Value) {
        self.entries.insert(identifier.into(), value);
    }

    /// Annotation for an identifier; absent entries read as `None`.
    pub fn get(&self, identifier: &str) -> Option<&Value> {
        self.entries.get(identifier)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<Value> {
        self.entries.shift_remove(identifier)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Identifiers in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record every identified descendant of `root` with a null annotation.
    ///
    /// No-op when the map is already non-empty: a host-populated map is never
    /// touched by auto-population.
    pub fn populate_from_tree(&mut self, root: &Element) {
        if !self.entries.is_empty() {
            return;
        }
        root.walk(&mut |element| {
            if let Some(id) = element.id() {
                self.entries.entry(id.to_string()).or_insert(Value::Null);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;

    fn tree() -> Element {
        Element::new(ElementType::Pane)
            .with_child(Element::new(ElementType::Button).with_id("first"))
            .with_child(Element::new(ElementType::Slider)) // no id
            .with_child(
                Element::new(ElementType::Pane)
                    .with_child(Element::new(ElementType::TextField).with_id("second")),
            )
    }

    #[test]
    fn test_populate_records_identified_elements_in_order() {
        let mut map = AnnotationMap::new();
        map.populate_from_tree(&tree());

        let ids: Vec<&str> = map.identifiers().collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(map.get("first"), Some(&Value::Null));
    }

    #[test]
    fn test_populate_never_touches_non_empty_map() {
        let mut map = AnnotationMap::new();
        map.insert("custom", Value::String("payload".into()));
        map.populate_from_tree(&tree());

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("first"), None);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut map = AnnotationMap::new();
        map.insert("z", Value::Null);
        map.insert("a", Value::Null);
        map.insert("m", Value::Null);

        let ids: Vec<&str> = map.identifiers().collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
