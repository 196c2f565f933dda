use thiserror::Error;

pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors produced by the scene host core.
///
/// "No callback resolved" is deliberately absent: an element without a
/// matching host function is skipped silently, it is not a failure.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The markup loader rejected the supplied markup.
    #[error("Markup parse error: {0}")]
    Parse(String),

    /// No host scripting context is attached (not yet available, or torn down).
    #[error("Host scripting context is unavailable")]
    HostUnavailable,

    /// The host member does not expose the requested function.
    #[error("Host member '{member}' has no function '{function}'")]
    MissingFunction { member: String, function: String },

    /// A host-script function was invoked and raised an error.
    #[error("Host invocation failed: {0}")]
    Invoke(String),

    /// The calling thread stopped waiting before the UI thread ran the work.
    #[error("Interrupted while waiting for the UI thread")]
    Interrupted,

    /// Work scheduled on the UI thread failed; wraps the work's own error.
    #[error("Execution on the UI thread failed: {0}")]
    ExecutionFailed(#[source] Box<SceneError>),

    /// A deferred task was cancelled before its result was observed.
    #[error("Task was cancelled")]
    Cancelled,

    /// A blocking wait was issued from the UI thread itself.
    #[error("Blocking wait on the UI thread would deadlock")]
    SelfWaitDeadlock,

    /// The executor has been shut down and accepts no further work.
    #[error("UI executor is not running")]
    ExecutorStopped,

    /// No utility factory is registered under the requested name.
    #[error("Unknown host utility: '{0}'")]
    UnknownUtility(String),
}
