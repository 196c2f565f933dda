//! Callback Name Resolution
//!
//! Two-tier naming convention deciding which host-script function handles an
//! element's events:
//!
//! 1. `"{identifier}_callback"`: per-element override, unconditional
//!    priority when the host member exposes it;
//! 2. `"{label}$callback"`: class-level fallback keyed by the element
//!    type's short label (e.g. `button$callback`);
//! 3. neither present: no binding, skipped silently.
//!
//! Elements sharing an identifier resolve to the same override and therefore
//! share one callback; identifier-less elements of one type share the
//! class-level callback. Both are documented properties, not accidents.

use crate::element::ElementType;
use crate::error::SceneError;
use crate::host::HostContext;

/// Suffix of per-identifier override functions.
pub const ID_SUFFIX: &str = "_callback";

/// Suffix of class-level fallback functions.
pub const CLASS_SUFFIX: &str = "$callback";

/// Resolve the host function name handling events for one element.
///
/// Returns `Ok(None)` when no convention-named function exists; that is the
/// ordinary "skip this element" outcome, not an error.
///
/// # Errors
/// [`SceneError::HostUnavailable`] when no scripting context is attached.
pub fn resolve(
    host: &dyn HostContext,
    member: &str,
    identifier: Option<&str>,
    element_type: ElementType,
) -> Result<Option<String>, SceneError> {
    if let Some(id) = identifier {
        let override_name = format!("{}{}", id, ID_SUFFIX);
        if host.has_function(member, &override_name)? {
            return Ok(Some(override_name));
        }
    }

    if let Some(label) = element_type.short_label() {
        let class_name = format!("{}{}", label, CLASS_SUFFIX);
        if host.has_function(member, &class_name)? {
            return Ok(Some(class_name));
        }
    }

    Ok(None)
}
