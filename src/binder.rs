//! Event Binder
//!
//! The orchestrator of a bind pass: walks the annotation map, resolves a
//! callback name for each identified element, and installs at most one
//! listener entry per identifier. When a native event fires, the matching
//! entry schedules a fire-and-forget host invocation on the UI thread with
//! the fixed four-argument contract:
//!
//! 1. the originating element's descriptor,
//! 2. the native event,
//! 3. the annotation value captured at bind time (or null),
//! 4. the instance's current data string.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::annotations::AnnotationMap;
use crate::element::{Element, EventKind, UiEvent};
use crate::error::SceneError;
use crate::executor::PlatformExecutor;
use crate::host::HostContext;
use crate::resolver;

/// One installed listener: element identifier, resolved host function, the
/// native event kind that triggers it, and the annotation captured at bind
/// time.
#[derive(Clone, Debug)]
pub struct ResolvedBinding {
    pub identifier: String,
    pub callback: String,
    pub event_kind: EventKind,
    pub annotation: Value,
}

/// Listener table for one scene instance.
///
/// Each bind pass replaces the table wholesale: no incremental diffing, no
/// listener stacking. Elements no longer present (or no longer resolvable)
/// simply have no entry after the pass.
#[derive(Default)]
pub struct EventBinder {
    bindings: RwLock<IndexMap<String, ResolvedBinding>>,
}

impl EventBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one bind pass over `root`, replacing the current listener table.
    ///
    /// An empty annotation map is auto-populated from the tree first. For
    /// each identifier: a missing element, an unmapped element type, an
    /// unresolvable callback, and an unavailable host context are all
    /// skipped silently. Returns the number of listeners installed.
    pub fn bind(
        &self,
        root: &Element,
        annotations: &mut AnnotationMap,
        host: &dyn HostContext,
        member: &str,
    ) -> usize {
        annotations.populate_from_tree(root);

        let mut table = IndexMap::new();
        for id in annotations.identifiers() {
            let Some(element) = root.lookup(id) else {
                // The host may declare annotations for elements not present
                // in this load.
                continue;
            };
            let Some((event_kind, _label)) = element.element_type.dispatch_entry() else {
                continue;
            };
            let callback = match resolver::resolve(host, member, Some(id), element.element_type) {
                Ok(Some(name)) => name,
                Ok(None) => continue,
                Err(SceneError::HostUnavailable) => continue,
                Err(err) => {
                    warn!("Callback resolution failed for '{}': {}", id, err);
                    continue;
                }
            };
            let annotation = annotations.get(id).cloned().unwrap_or(Value::Null);
            table.insert(
                id.to_string(),
                ResolvedBinding {
                    identifier: id.to_string(),
                    callback,
                    event_kind,
                    annotation,
                },
            );
        }

        debug!("Bind pass installed {} listener(s)", table.len());
        let installed = table.len();
        *self.bindings.write().unwrap() = table;
        installed
    }

    /// Number of installed listeners.
    pub fn len(&self) -> usize {
        self.bindings.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The installed binding for an identifier, if any.
    pub fn binding_for(&self, identifier: &str) -> Option<ResolvedBinding> {
        self.bindings.read().unwrap().get(identifier).cloned()
    }

    /// Deliver a native event for `element`.
    ///
    /// When a listener is installed for the element's identifier and its
    /// event kind matches, the host invocation is scheduled fire-and-forget
    /// on the UI thread. Host-side failures are logged and isolated; they
    /// never propagate out of event handling.
    pub fn dispatch(
        &self,
        element: &Element,
        event: UiEvent,
        host: &Arc<dyn HostContext>,
        member: &str,
        data: &str,
        executor: &PlatformExecutor,
    ) {
        let Some(id) = element.id() else {
            return;
        };
        let Some(binding) = self.binding_for(id) else {
            return;
        };
        if binding.event_kind != event.kind {
            return;
        }

        let args = vec![
            element.descriptor(),
            serde_json::to_value(&event).unwrap_or(Value::Null),
            binding.annotation.clone(),
            Value::String(data.to_string()),
        ];

        let host = host.clone();
        let member = member.to_string();
        let callback = binding.callback;
        let scheduled = executor.run(move || {
            if let Err(err) = host.invoke(&member, &callback, &args) {
                warn!("Host callback '{}' failed: {}", callback, err);
            }
        });
        if let Err(err) = scheduled {
            warn!("Could not schedule host callback for '{}': {}", id, err);
        }
    }
}
