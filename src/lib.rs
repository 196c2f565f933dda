//! Callback dispatch and thread marshaling for host-embedded UI scenes
//!
//! Lets host-side script attach behavior to individual elements of a
//! declaratively-described UI scene without writing code in the UI's native
//! language. The crate is the dispatch core only; parsing, rendering and the
//! actual display surfaces are external collaborators behind traits.
//!
//! # How a scene comes alive
//!
//! 1. The host hands over named startup parameters
//!    ([`InstanceParams::from_named`]); the markup gets the default `<?xml`
//!    prologue when it lacks one and is handed to the [`MarkupLoader`].
//! 2. A bind pass ([`SceneInstance::init_bindings`]) walks the annotation
//!    map, resolves one host function per identified element through the
//!    two-tier naming convention (`{id}_callback`, then `{label}$callback`)
//!    and installs the listener table.
//! 3. When a widget fires, the matching listener schedules the host function
//!    on the single UI processing thread with four positional arguments:
//!    element descriptor, event, annotation value, data string.
//!
//! Work can be pushed onto the UI thread from anywhere through the
//! [`PlatformExecutor`]: fire-and-forget, blocking, or deferred with
//! cooperative cancellation. Windows created by a scene are owned by it and
//! closed with it.
//!
//! # Example
//!
//! ```rust,ignore
//! use scene_host::{InstanceParams, SceneRuntime, SceneWindow};
//!
//! let runtime = SceneRuntime::start(host, loader, windows);
//! let params = InstanceParams::from_named(&startup_params);
//! let window = SceneWindow::open(&runtime, &params)?;
//! window.instance().init_bindings();
//! window.show();
//! ```

pub mod annotations;
pub mod binder;
pub mod element;
pub mod error;
pub mod executor;
pub mod host;
pub mod instance;
pub mod markup;
pub mod resolver;
pub mod util;
pub mod window;

pub use annotations::AnnotationMap;
pub use binder::{EventBinder, ResolvedBinding};
pub use element::{Element, ElementType, EventKind, UiEvent};
pub use error::{Result, SceneError};
pub use executor::{PlatformExecutor, TaskHandle};
pub use host::HostContext;
pub use instance::{InstanceParams, SceneInstance, SceneRuntime, SceneWindow};
pub use markup::MarkupLoader;
pub use util::{HostUtility, UtilityRegistry};
pub use window::{DisplaySurface, OwnedWindows, WindowSystem};
