//! Scene Instances and Windows
//!
//! The embedding surface of the crate. A [`SceneRuntime`] bundles the shared
//! collaborators (executor, host bridge, markup loader, window system,
//! utility registry); a [`SceneInstance`] is one loaded scene with its
//! annotation map, listener table and data string; a [`SceneWindow`] pairs an
//! instance with a display surface and tracks the child windows it creates.
//!
//! Startup failures never cross this boundary: bad parameters and parse
//! errors degrade to a visible diagnostic tree, and `init_bindings` reports
//! success as a plain bool.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use tracing::{debug, warn};

use crate::annotations::AnnotationMap;
use crate::binder::EventBinder;
use crate::element::{Element, UiEvent};
use crate::error::SceneError;
use crate::executor::{PlatformExecutor, TaskHandle};
use crate::host::HostContext;
use crate::markup::{MarkupLoader, diagnostic_root, ensure_prologue};
use crate::util::{HostUtility, UtilityRegistry};
use crate::window::{DisplaySurface, OwnedWindows, WindowSystem};

/// Default window content width when the `w` parameter is absent or
/// unparsable.
pub const DEFAULT_WIDTH: f64 = 400.0;

/// Default window content height when the `h` parameter is absent or
/// unparsable.
pub const DEFAULT_HEIGHT: f64 = 300.0;

// ============================================================================
// Instance Parameters
// ============================================================================

/// Startup parameters of one scene instance.
#[derive(Clone, Debug)]
pub struct InstanceParams {
    /// Scene markup; absent renders a diagnostic instead of content
    pub markup: Option<String>,
    /// Opaque data string passed to every callback invocation
    pub data: String,
    /// Name of the host member holding the callbacks
    pub callbacks: Option<String>,
    /// Window content width
    pub width: f64,
    /// Window content height
    pub height: f64,
}

impl InstanceParams {
    /// Build parameters from the host's named startup strings.
    ///
    /// Recognized keys: `markup`, `data`, `callbacks`, `w`, `h`. The sizes
    /// fall back to 400x300 when a value is absent or fails to parse.
    pub fn from_named(named: &HashMap<String, String>) -> Self {
        let dimension = |key: &str, default: f64| {
            named
                .get(key)
                .and_then(|raw| raw.parse::<f64>().ok())
                .unwrap_or(default)
        };
        Self {
            markup: named.get("markup").cloned(),
            data: named.get("data").cloned().unwrap_or_default(),
            callbacks: named.get("callbacks").cloned(),
            width: dimension("w", DEFAULT_WIDTH),
            height: dimension("h", DEFAULT_HEIGHT),
        }
    }
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            markup: None,
            data: String::new(),
            callbacks: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// ============================================================================
// Scene Runtime
// ============================================================================

/// Shared collaborators every instance in the process uses.
///
/// Cheap to clone; each field is an `Arc`. The executor is started when the
/// runtime is built and must be shut down explicitly (or when the last clone
/// drops).
#[derive(Clone)]
pub struct SceneRuntime {
    executor: Arc<PlatformExecutor>,
    host: Arc<dyn HostContext>,
    loader: Arc<dyn MarkupLoader>,
    windows: Arc<dyn WindowSystem>,
    utilities: Arc<UtilityRegistry>,
}

impl SceneRuntime {
    /// Start the UI processing thread and assemble the runtime around it.
    pub fn start(
        host: Arc<dyn HostContext>,
        loader: Arc<dyn MarkupLoader>,
        windows: Arc<dyn WindowSystem>,
    ) -> Self {
        Self {
            executor: Arc::new(PlatformExecutor::start()),
            host,
            loader,
            windows,
            utilities: Arc::new(UtilityRegistry::new()),
        }
    }

    pub fn executor(&self) -> &Arc<PlatformExecutor> {
        &self.executor
    }

    /// Registry to populate with named utilities at startup.
    pub fn utilities(&self) -> &UtilityRegistry {
        &self.utilities
    }

    /// Drain the work queue and stop the UI processing thread.
    pub fn shutdown(&self) {
        self.executor.shutdown();
    }
}

// ============================================================================
// Scene Instance
// ============================================================================

/// One loaded scene: element tree, annotation map, listener table, data
/// string, and the resolved callback member.
///
/// All operations are callable from any thread. Binding and the annotation
/// map are guarded by locks; mutating the annotation map while a bind pass is
/// running is unsupported.
pub struct SceneInstance {
    executor: Arc<PlatformExecutor>,
    host: Arc<dyn HostContext>,
    utilities: Arc<UtilityRegistry>,
    markup: String,
    root: RwLock<Element>,
    data: RwLock<String>,
    member: Mutex<Option<String>>,
    annotations: Mutex<AnnotationMap>,
    binder: EventBinder,
    active_util: Mutex<Option<Arc<dyn HostUtility>>>,
}

impl SceneInstance {
    /// Load an instance from startup parameters.
    ///
    /// Never fails: a missing `markup` parameter or a parse error substitutes
    /// a diagnostic tree and the instance stays fully operational.
    pub fn load(runtime: &SceneRuntime, params: &InstanceParams) -> Self {
        let (markup, root) = match &params.markup {
            None => {
                warn!("Missing required parameter: markup");
                (
                    String::new(),
                    diagnostic_root("Missing required parameter: markup"),
                )
            }
            Some(raw) => {
                let effective = ensure_prologue(raw).into_owned();
                match runtime.loader.load(&effective) {
                    Ok(root) => (effective, root),
                    Err(err) => {
                        warn!("Markup failed to load: {}", err);
                        (effective, diagnostic_root(&format!("Markup failed to load: {}", err)))
                    }
                }
            }
        };

        Self {
            executor: runtime.executor.clone(),
            host: runtime.host.clone(),
            utilities: runtime.utilities.clone(),
            markup,
            root: RwLock::new(root),
            data: RwLock::new(params.data.clone()),
            member: Mutex::new(params.callbacks.clone()),
            annotations: Mutex::new(AnnotationMap::new()),
            binder: EventBinder::new(),
            active_util: Mutex::new(None),
        }
    }

    /// The effective markup handed to the loader, prologue included.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The configured callback member name, if any.
    pub fn callback_member(&self) -> Option<String> {
        self.member.lock().unwrap().clone()
    }

    /// Snapshot of the root element.
    pub fn root(&self) -> Element {
        self.root.read().unwrap().clone()
    }

    /// First element with the given identifier, cloned out of the tree.
    pub fn lookup(&self, identifier: &str) -> Option<Element> {
        self.root.read().unwrap().lookup(identifier).cloned()
    }

    /// Every element carrying the given style class, cloned out of the tree.
    pub fn lookup_all(&self, style_class: &str) -> Vec<Element> {
        self.root
            .read()
            .unwrap()
            .lookup_all(style_class)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn data(&self) -> String {
        self.data.read().unwrap().clone()
    }

    pub fn set_data(&self, data: impl Into<String>) {
        *self.data.write().unwrap() = data.into();
    }

    /// The annotation map, locked for the duration of the guard.
    pub fn annotations(&self) -> MutexGuard<'_, AnnotationMap> {
        self.annotations.lock().unwrap()
    }

    /// Run a bind pass with the configured callback member.
    ///
    /// Returns `false` (never raises) when no member is configured or no host
    /// context is attached; the failure clears the stored member so a later
    /// [`SceneInstance::init_bindings_with`] can supply one. An empty member
    /// name counts as unconfigured.
    pub fn init_bindings(&self) -> bool {
        let member = match self.callback_member() {
            Some(member) if !member.is_empty() => member,
            _ => {
                warn!("No callback member configured; bindings not initialized");
                *self.member.lock().unwrap() = None;
                return false;
            }
        };
        if !self.host.is_attached() {
            warn!("Host context unavailable; bindings not initialized");
            *self.member.lock().unwrap() = None;
            return false;
        }

        let root = self.root.read().unwrap();
        let mut annotations = self.annotations.lock().unwrap();
        let installed = self
            .binder
            .bind(&root, &mut annotations, self.host.as_ref(), &member);
        debug!("Initialized {} binding(s) against '{}'", installed, member);
        true
    }

    /// Run a bind pass, supplying a callback member if none is configured.
    ///
    /// An already-configured member is kept; the argument only takes effect
    /// when the instance has none (initial startup omitted it, or a previous
    /// pass failed and cleared it). An empty argument is ignored.
    pub fn init_bindings_with(&self, member: impl Into<String>) -> bool {
        let member = member.into();
        if !member.is_empty() {
            let mut current = self.member.lock().unwrap();
            if current.is_none() {
                *current = Some(member);
            }
        }
        self.init_bindings()
    }

    /// Deliver a native event for the element with the given identifier.
    ///
    /// Silently ignored when the element is missing, no listener is
    /// installed, or the event kind does not match the installed listener.
    pub fn dispatch(&self, identifier: &str, event: UiEvent) {
        let Some(member) = self.callback_member() else {
            return;
        };
        let root = self.root.read().unwrap();
        let Some(element) = root.lookup(identifier) else {
            return;
        };
        let data = self.data();
        self.binder
            .dispatch(element, event, &self.host, &member, &data, &self.executor);
    }

    /// Number of listeners installed by the last bind pass.
    pub fn binding_count(&self) -> usize {
        self.binder.len()
    }

    /// Activate the utility registered under `name`.
    ///
    /// # Errors
    /// [`SceneError::UnknownUtility`] when nothing is registered under the
    /// name; the previously active utility is kept in that case.
    pub fn set_util(&self, name: &str) -> Result<(), SceneError> {
        let utility = self.utilities.create(name)?;
        *self.active_util.lock().unwrap() = Some(utility);
        Ok(())
    }

    /// The active utility, if one was set.
    pub fn util(&self) -> Option<Arc<dyn HostUtility>> {
        self.active_util.lock().unwrap().clone()
    }

    /// Whether the calling thread is the UI processing thread.
    pub fn is_ui_thread(&self) -> bool {
        self.executor.is_ui_thread()
    }

    /// Schedule fire-and-forget work on the UI thread.
    ///
    /// # Errors
    /// See [`PlatformExecutor::run`].
    pub fn run(&self, work: impl FnOnce() + Send + 'static) -> Result<(), SceneError> {
        self.executor.run(work)
    }

    /// Run work on the UI thread and wait for its result.
    ///
    /// # Errors
    /// See [`PlatformExecutor::run_wait`].
    pub fn run_wait<T: Send + 'static>(
        &self,
        work: impl FnOnce() -> Result<T, SceneError> + Send + 'static,
    ) -> Result<T, SceneError> {
        self.executor.run_wait(work)
    }

    /// Schedule cancellable work on the UI thread and return its handle.
    ///
    /// # Errors
    /// See [`PlatformExecutor::run_deferred`].
    pub fn run_deferred<T: Send + 'static>(
        &self,
        work: impl FnOnce(&TaskHandle<T>) -> Result<T, SceneError> + Send + 'static,
    ) -> Result<TaskHandle<T>, SceneError> {
        self.executor.run_deferred(work)
    }
}

// ============================================================================
// Scene Window
// ============================================================================

/// A scene instance paired with its display surface.
///
/// Windows form an ownership tree by composition: a child created through
/// [`SceneWindow::create_window`] keeps a non-owning back-reference to its
/// owner, and the owner records the child so a close request cascades to
/// every child still showing.
pub struct SceneWindow {
    runtime: SceneRuntime,
    instance: SceneInstance,
    surface: Arc<dyn DisplaySurface>,
    owner: Mutex<Weak<SceneWindow>>,
    owned: OwnedWindows<SceneWindow>,
}

impl SceneWindow {
    /// Create a window (surface plus loaded instance) for the given
    /// parameters. The surface starts hidden; call [`SceneWindow::show`].
    ///
    /// # Errors
    /// Surface creation errors from the display subsystem. Markup problems do
    /// not fail creation; they render a diagnostic.
    pub fn open(runtime: &SceneRuntime, params: &InstanceParams) -> Result<Arc<Self>, SceneError> {
        let surface = runtime.windows.create_surface(params.width, params.height)?;
        let instance = SceneInstance::load(runtime, params);
        Ok(Arc::new(Self {
            runtime: runtime.clone(),
            instance,
            surface,
            owner: Mutex::new(Weak::new()),
            owned: OwnedWindows::new(),
        }))
    }

    /// Create a child window owned by this one.
    ///
    /// The child uses the default content size and the same runtime; it is
    /// recorded in this window's owned set and keeps a weak back-reference to
    /// its owner.
    ///
    /// # Errors
    /// Surface creation errors from the display subsystem.
    pub fn create_window(
        self: &Arc<Self>,
        markup: &str,
        data: &str,
        callbacks: &str,
    ) -> Result<Arc<SceneWindow>, SceneError> {
        let params = InstanceParams {
            markup: Some(markup.to_string()),
            data: data.to_string(),
            callbacks: Some(callbacks.to_string()),
            ..InstanceParams::default()
        };
        let child = Self::open(&self.runtime, &params)?;
        *child.owner.lock().unwrap() = Arc::downgrade(self);
        self.owned.register(child.clone());
        Ok(child)
    }

    /// The loaded instance behind this window.
    pub fn instance(&self) -> &SceneInstance {
        &self.instance
    }

    /// The display surface behind this window.
    pub fn surface(&self) -> &Arc<dyn DisplaySurface> {
        &self.surface
    }

    /// The owner window, while it is still alive.
    pub fn owner(&self) -> Option<Arc<SceneWindow>> {
        self.owner.lock().unwrap().upgrade()
    }

    /// The windows this one created, closed ones included. Each entry is the
    /// full child handle, so its instance and surface stay reachable.
    pub fn owned_windows(&self) -> &OwnedWindows<SceneWindow> {
        &self.owned
    }

    pub fn show(&self) {
        self.surface.show();
    }

    pub fn is_visible(&self) -> bool {
        self.surface.is_visible()
    }

    /// Close this window and every owned child still showing.
    pub fn close(&self) {
        self.owned.close_showing();
        self.surface.close();
    }

    /// React to a close request from the display subsystem: cascade to the
    /// owned children first, then close this window's surface.
    pub fn handle_close_request(&self) {
        debug!("Close request; cascading to owned windows");
        self.close();
    }
}

impl DisplaySurface for SceneWindow {
    fn show(&self) {
        SceneWindow::show(self);
    }

    fn close(&self) {
        SceneWindow::close(self);
    }

    fn is_visible(&self) -> bool {
        SceneWindow::is_visible(self)
    }
}
