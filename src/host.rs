//! Host Scripting Bridge
//!
//! Adapter boundary to the embedding host's scripting context. Concrete
//! engines (a browser JS context, an embedded interpreter, a test double)
//! implement [`HostContext`]; the dispatch core only resolves members, tests
//! for functions, and invokes them with positional value arguments.
//!
//! The context may be temporarily or permanently unavailable, before the
//! host attaches it or after teardown. Every operation then fails with
//! [`SceneError::HostUnavailable`], which binding code treats the same as
//! "no callback resolved".

use serde_json::Value;

use crate::error::SceneError;

/// The host scripting context as seen by the dispatch core.
///
/// All methods take the member (the named global object holding the
/// callbacks) by name so the core never holds engine-specific references.
/// Implementations must be callable from any thread; invocations triggered
/// by UI events always arrive on the UI processing thread.
pub trait HostContext: Send + Sync {
    /// Whether a scripting context is currently attached.
    fn is_attached(&self) -> bool;

    /// Whether `member` exposes a function named `function`.
    ///
    /// # Errors
    /// [`SceneError::HostUnavailable`] when no context is attached.
    fn has_function(&self, member: &str, function: &str) -> Result<bool, SceneError>;

    /// Invoke `member.function(args...)` with positional arguments.
    ///
    /// # Errors
    /// [`SceneError::HostUnavailable`] when no context is attached,
    /// [`SceneError::MissingFunction`] when the function does not exist,
    /// [`SceneError::Invoke`] when the host-side function raises.
    fn invoke(&self, member: &str, function: &str, args: &[Value]) -> Result<Value, SceneError>;
}
