//! Host Utility Registry
//!
//! Named utility objects the host script can request from the runtime. Each
//! utility is registered up front under a well-known name with a factory;
//! requesting an unregistered name is an error, never a dynamic lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use crate::error::SceneError;

/// A utility object exposed to host script by name.
///
/// Utilities are plain operation bundles: the host invokes named operations
/// with positional value arguments, mirroring the callback calling
/// convention.
pub trait HostUtility: Send + Sync {
    /// Invoke one named operation.
    ///
    /// # Errors
    /// [`SceneError::Invoke`] when the operation is unknown or fails.
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, SceneError>;
}

type UtilityFactory = Box<dyn Fn() -> Arc<dyn HostUtility> + Send + Sync>;

/// Registry of utility factories keyed by well-known name.
#[derive(Default)]
pub struct UtilityRegistry {
    factories: Mutex<HashMap<String, UtilityFactory>>,
}

impl UtilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous registration.
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Arc<dyn HostUtility> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering utility '{}'", name);
        self.factories
            .lock()
            .unwrap()
            .insert(name, Box::new(factory));
    }

    /// Instantiate the utility registered under `name`.
    ///
    /// # Errors
    /// [`SceneError::UnknownUtility`] when nothing is registered under the
    /// name.
    pub fn create(&self, name: &str) -> Result<Arc<dyn HostUtility>, SceneError> {
        self.factories
            .lock()
            .unwrap()
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| SceneError::UnknownUtility(name.to_string()))
    }

    /// Registered names, unordered.
    pub fn names(&self) -> Vec<String> {
        self.factories.lock().unwrap().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoUtility;

    impl HostUtility for EchoUtility {
        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, SceneError> {
            match operation {
                "echo" => Ok(args.first().cloned().unwrap_or(Value::Null)),
                other => Err(SceneError::Invoke(format!("unknown operation: {}", other))),
            }
        }
    }

    #[test]
    fn test_registered_utility_is_created_by_name() {
        let registry = UtilityRegistry::new();
        registry.register("echo", || Arc::new(EchoUtility));

        let utility = registry.create("echo").unwrap();
        let out = utility
            .invoke("echo", &[Value::String("hi".into())])
            .unwrap();
        assert_eq!(out, Value::String("hi".into()));
    }

    #[test]
    fn test_unregistered_name_is_an_error() {
        let registry = UtilityRegistry::new();
        assert!(matches!(
            registry.create("clipboard"),
            Err(SceneError::UnknownUtility(name)) if name == "clipboard"
        ));
    }

    #[test]
    fn test_reregistration_replaces_factory() {
        struct NullUtility;
        impl HostUtility for NullUtility {
            fn invoke(&self, _operation: &str, _args: &[Value]) -> Result<Value, SceneError> {
                Ok(Value::Null)
            }
        }

        let registry = UtilityRegistry::new();
        registry.register("tool", || Arc::new(NullUtility));
        registry.register("tool", || Arc::new(EchoUtility));

        let utility = registry.create("tool").unwrap();
        let out = utility
            .invoke("echo", &[Value::Bool(true)])
            .unwrap();
        assert_eq!(out, Value::Bool(true));
        assert_eq!(registry.names(), vec!["tool".to_string()]);
    }
}
