//! Element Tree Types
//!
//! Language-agnostic description of a loaded UI scene. The tree is produced
//! by an external [`MarkupLoader`](crate::markup::MarkupLoader); this module
//! only defines its shape, the fixed widget-kind vocabulary, and the static
//! dispatch table mapping widget kinds to native event kinds.

use serde::{Deserialize, Serialize};

// ============================================================================
// Element Type Enum
// ============================================================================

/// The fixed set of UI widget kinds recognized by the dispatch core.
///
/// This is externally supplied vocabulary: the core never interprets a kind
/// beyond looking it up in [`ElementType::dispatch_entry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Push button
    Button,
    /// Two-state toggle
    CheckBox,
    /// Latching button
    ToggleButton,
    /// Exclusive-group toggle
    RadioButton,
    /// Button opening a menu
    MenuButton,
    /// Clickable link
    Hyperlink,
    /// Editable drop-down selection
    ComboBox,
    /// Non-editable drop-down selection
    Choice,
    /// Draggable value slider
    Slider,
    /// Single-line text input
    TextField,
    /// Scrollable item list
    ListView,
    /// Layout container
    Pane,
    /// Static text display
    Label,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Button => write!(f, "button"),
            ElementType::CheckBox => write!(f, "checkbox"),
            ElementType::ToggleButton => write!(f, "togglebutton"),
            ElementType::RadioButton => write!(f, "radiobutton"),
            ElementType::MenuButton => write!(f, "menubutton"),
            ElementType::Hyperlink => write!(f, "hyperlink"),
            ElementType::ComboBox => write!(f, "combobox"),
            ElementType::Choice => write!(f, "choice"),
            ElementType::Slider => write!(f, "slider"),
            ElementType::TextField => write!(f, "textfield"),
            ElementType::ListView => write!(f, "listview"),
            ElementType::Pane => write!(f, "pane"),
            ElementType::Label => write!(f, "label"),
        }
    }
}

impl std::str::FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "button" => Ok(ElementType::Button),
            "checkbox" => Ok(ElementType::CheckBox),
            "togglebutton" => Ok(ElementType::ToggleButton),
            "radiobutton" => Ok(ElementType::RadioButton),
            "menubutton" => Ok(ElementType::MenuButton),
            "hyperlink" => Ok(ElementType::Hyperlink),
            "combobox" => Ok(ElementType::ComboBox),
            "choice" => Ok(ElementType::Choice),
            "slider" => Ok(ElementType::Slider),
            "textfield" => Ok(ElementType::TextField),
            "listview" => Ok(ElementType::ListView),
            "pane" => Ok(ElementType::Pane),
            "label" => Ok(ElementType::Label),
            _ => Err(format!("Unknown element type: {}", s)),
        }
    }
}

impl ElementType {
    /// Static dispatch table: widget kind -> (native event kind, short label).
    ///
    /// Kinds absent from the table (containers, static text, and the Choice
    /// control) take part in no event binding; callers skip them silently.
    pub fn dispatch_entry(self) -> Option<(EventKind, &'static str)> {
        match self {
            ElementType::Button => Some((EventKind::Action, "button")),
            ElementType::CheckBox => Some((EventKind::Action, "checkbox")),
            ElementType::ToggleButton => Some((EventKind::Action, "togglebutton")),
            ElementType::RadioButton => Some((EventKind::Action, "radiobutton")),
            ElementType::MenuButton => Some((EventKind::Action, "menubutton")),
            ElementType::Hyperlink => Some((EventKind::Action, "hyperlink")),
            ElementType::ComboBox => Some((EventKind::Action, "combobox")),
            // Choice is intentionally unmapped; see crate docs.
            ElementType::Choice => None,
            ElementType::Slider => Some((EventKind::MouseReleased, "slider")),
            ElementType::TextField => Some((EventKind::Action, "textfield")),
            ElementType::ListView => Some((EventKind::EditCommit, "listview")),
            ElementType::Pane => None,
            ElementType::Label => None,
        }
    }

    /// Short lowercase label used for class-level callback names.
    pub fn short_label(self) -> Option<&'static str> {
        self.dispatch_entry().map(|(_, label)| label)
    }
}

// ============================================================================
// Event Kinds
// ============================================================================

/// Native event kinds a listener can be installed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Activation (button press, text-field commit, selection change)
    Action,
    /// Mouse button released over the element (sliders)
    MouseReleased,
    /// An in-place edit was committed (list views)
    EditCommit,
}

/// A native UI event as delivered to the dispatch core.
///
/// The display subsystem constructs these when a widget fires; `detail` is an
/// engine-specific payload passed through to host callbacks untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UiEvent {
    /// What kind of interaction produced this event
    pub kind: EventKind,
    /// Engine-specific payload (opaque to the core)
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl UiEvent {
    /// Create an event with no payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            detail: serde_json::Value::Null,
        }
    }

    /// Attach an engine-specific payload.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

// ============================================================================
// Element Tree
// ============================================================================

/// A node in the loaded UI tree.
///
/// Owned by the tree; the dispatch core never mutates elements, it only walks
/// them during binding and serializes shallow descriptors for host callbacks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Element {
    /// Element identifier; must be unique among elements that resolve a
    /// callback (elements sharing an identifier share one binding)
    #[serde(default)]
    pub identifier: Option<String>,
    /// Widget kind
    pub element_type: ElementType,
    /// Style classes for `lookup_all`-style queries
    #[serde(default)]
    pub style_classes: Vec<String>,
    /// Display text (labels, diagnostic content)
    #[serde(default)]
    pub text: Option<String>,
    /// Ordered children
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element of the given kind with no id, classes or children.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            identifier: None,
            element_type,
            style_classes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    /// Add a style class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.style_classes.push(class.into());
        self
    }

    /// Set the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Non-empty identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|id| !id.is_empty())
    }

    /// Depth-first walk over this element and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Find the first descendant (or self) with the given identifier.
    pub fn lookup(&self, id: &str) -> Option<&Element> {
        let mut found = None;
        self.walk(&mut |element| {
            if found.is_none() && element.id() == Some(id) {
                found = Some(element);
            }
        });
        found
    }

    /// Collect every descendant (or self) carrying the given style class.
    pub fn lookup_all(&self, style_class: &str) -> Vec<&Element> {
        let mut matches = Vec::new();
        self.walk(&mut |element| {
            if element.style_classes.iter().any(|c| c == style_class) {
                matches.push(element);
            }
        });
        matches
    }

    /// Shallow descriptor passed to host callbacks as the element reference.
    ///
    /// Children are omitted: the host navigates the tree through the
    /// instance's lookup operations, not through callback arguments.
    pub fn descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.identifier,
            "type": self.element_type,
            "styleClasses": self.style_classes,
            "text": self.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Element {
        Element::new(ElementType::Pane)
            .with_child(
                Element::new(ElementType::Button)
                    .with_id("go")
                    .with_class("primary"),
            )
            .with_child(
                Element::new(ElementType::Pane).with_child(
                    Element::new(ElementType::Slider)
                        .with_id("volume")
                        .with_class("primary"),
                ),
            )
    }

    #[test]
    fn test_dispatch_entry_covers_action_controls() {
        for ty in [
            ElementType::Button,
            ElementType::CheckBox,
            ElementType::ToggleButton,
            ElementType::RadioButton,
            ElementType::MenuButton,
            ElementType::Hyperlink,
            ElementType::ComboBox,
            ElementType::TextField,
        ] {
            let (kind, _) = ty.dispatch_entry().expect("action control is mapped");
            assert_eq!(kind, EventKind::Action);
        }
        assert_eq!(
            ElementType::Slider.dispatch_entry(),
            Some((EventKind::MouseReleased, "slider"))
        );
        assert_eq!(
            ElementType::ListView.dispatch_entry(),
            Some((EventKind::EditCommit, "listview"))
        );
    }

    #[test]
    fn test_choice_and_containers_are_unmapped() {
        assert_eq!(ElementType::Choice.dispatch_entry(), None);
        assert_eq!(ElementType::Pane.dispatch_entry(), None);
        assert_eq!(ElementType::Label.dispatch_entry(), None);
    }

    #[test]
    fn test_type_roundtrip_through_str() {
        for ty in [ElementType::Button, ElementType::ListView, ElementType::Choice] {
            let parsed: ElementType = ty.to_string().parse().expect("label parses back");
            assert_eq!(parsed, ty);
        }
        assert!("gizmo".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_lookup_finds_nested_descendant() {
        let tree = sample_tree();
        assert_eq!(
            tree.lookup("volume").map(|e| e.element_type),
            Some(ElementType::Slider)
        );
        assert!(tree.lookup("missing").is_none());
    }

    #[test]
    fn test_lookup_all_by_style_class() {
        let tree = sample_tree();
        let matches = tree.lookup_all("primary");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id(), Some("go"));
        assert_eq!(matches[1].id(), Some("volume"));
    }

    #[test]
    fn test_empty_identifier_reads_as_none() {
        let element = Element::new(ElementType::Button).with_id("");
        assert_eq!(element.id(), None);
    }
}
