//! Capability Registry: the privileged-side table of named operations.
//!
//! The registry is populated once at startup. After it is handed to the
//! dispatcher as an `Arc<CapabilityRegistry>` nothing can mutate it, so the
//! handler table never races with in-flight calls. There is deliberately no
//! `unregister`.

use std::collections::HashMap;
use std::sync::Arc;

use super::capability::{Capability, CapabilityHandler};
use crate::error::{BridgeError, BridgeResult};

/// Canonical mapping from operation name to privileged handler.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    /// Capabilities indexed by name
    capabilities: HashMap<String, Capability>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `handler`.
    ///
    /// Fails with [`BridgeError::DuplicateCapability`] if the name is taken;
    /// the existing binding is left untouched.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CapabilityHandler>,
    ) -> BridgeResult<()> {
        let name = name.into();
        let description = name.clone();
        self.register_capability(Capability::new(name, description, handler))
    }

    /// Register a prebuilt descriptor.
    pub fn register_capability(&mut self, capability: Capability) -> BridgeResult<()> {
        if self.capabilities.contains_key(&capability.name) {
            return Err(BridgeError::DuplicateCapability(capability.name));
        }
        log::debug!("Registered capability '{}'", capability.name);
        self.capabilities
            .insert(capability.name.clone(), capability);
        Ok(())
    }

    /// Resolve a handler by name.
    pub fn resolve(&self, name: &str) -> BridgeResult<Arc<dyn CapabilityHandler>> {
        self.capabilities
            .get(name)
            .map(Capability::handler)
            .ok_or_else(|| BridgeError::UnknownCapability(name.to_string()))
    }

    /// Look up the full descriptor.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the total number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Seal the registry for sharing with the dispatcher.
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::handler_fn;
    use serde_json::json;

    fn constant(value: serde_json::Value) -> Arc<dyn CapabilityHandler> {
        handler_fn(move |_| {
            let value = value.clone();
            async move { Ok(Some(value)) }
        })
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let mut registry = CapabilityRegistry::new();
        registry.register("test:hello", constant(json!("hi"))).unwrap();

        assert_eq!(registry.len(), 1);
        let handler = registry.resolve("test:hello").unwrap();
        assert_eq!(handler.invoke(None).await.unwrap(), Some(json!("hi")));
    }

    #[tokio::test]
    async fn test_duplicate_keeps_first_binding() {
        let mut registry = CapabilityRegistry::new();
        registry.register("dup", constant(json!(1))).unwrap();

        let err = registry.register("dup", constant(json!(2))).unwrap_err();
        assert_eq!(err, BridgeError::DuplicateCapability("dup".into()));

        let handler = registry.resolve("dup").unwrap();
        assert_eq!(handler.invoke(None).await.unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_unknown_capability() {
        let registry = CapabilityRegistry::new();
        match registry.resolve("nope") {
            Err(BridgeError::UnknownCapability(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = CapabilityRegistry::new();
        registry.register("b", constant(json!(null))).unwrap();
        registry.register("a", constant(json!(null))).unwrap();
        registry
            .register_capability(Capability::new("c", "third", constant(json!(null))))
            .unwrap();

        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.get("c").unwrap().description, "third");
        assert!(registry.contains("a"));
        assert!(!registry.is_empty());
    }
}
