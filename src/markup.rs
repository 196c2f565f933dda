//! Markup Loading Boundary
//!
//! The markup parser is an external collaborator: this module defines the
//! trait it must satisfy, the default-prologue handling applied before markup
//! reaches it, and the diagnostic element substituted when loading fails.

use std::borrow::Cow;

use crate::element::{Element, ElementType};
use crate::error::SceneError;

/// Prologue marker recognized at the start of fully-formed markup.
pub const PROLOGUE_MARKER: &str = "<?xml";

/// Default prologue prepended to markup that lacks one.
///
/// Applied verbatim: the effective markup handed to the loader is exactly
/// this string concatenated with the original text.
pub const DEFAULT_PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Consumes a markup string and produces a UI node tree.
///
/// Implementations are black boxes to the dispatch core; the only contract is
/// a root element on success and [`SceneError::Parse`] on malformed input.
pub trait MarkupLoader: Send + Sync {
    /// Parse `markup` into an element tree.
    ///
    /// # Errors
    /// [`SceneError::Parse`] when the markup is malformed.
    fn load(&self, markup: &str) -> Result<Element, SceneError>;
}

/// Prepend the default prologue when the markup does not start with one.
pub fn ensure_prologue(markup: &str) -> Cow<'_, str> {
    if markup.starts_with(PROLOGUE_MARKER) {
        Cow::Borrowed(markup)
    } else {
        Cow::Owned(format!("{}{}", DEFAULT_PROLOGUE, markup))
    }
}

/// Diagnostic element shown in place of content when loading fails.
///
/// Parse failures never cross the instance boundary; the instance stays
/// usable with this tree as its root.
pub fn diagnostic_root(message: &str) -> Element {
    Element::new(ElementType::Pane)
        .with_class("scene-host-diagnostic")
        .with_child(Element::new(ElementType::Label).with_text(message))
}
