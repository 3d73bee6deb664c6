//! Capability definition: a named privileged operation and its handler.
//!
//! A capability is the unit the host exposes across the trust boundary. The
//! handler receives the optional call argument untouched (the gateway does
//! not validate shapes) and produces either a value, the "no selection"
//! sentinel, or a structured failure.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BridgeError;

/// What a handler produces: `Ok(Some(v))` is a value, `Ok(None)` is the
/// "no selection / cancelled" sentinel, `Err(_)` is a failure.
pub type HandlerResult = Result<Option<Value>, BridgeError>;

/// The privileged side of a capability.
///
/// Implementations must not panic across the boundary on bad input; the
/// dispatcher catches panics anyway, but the caller then only sees a generic
/// `Handler` failure.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Serve one call.
    async fn invoke(&self, argument: Option<Value>) -> HandlerResult;
}

/// A registered capability descriptor.
#[derive(Clone)]
pub struct Capability {
    /// Unique identifier, the channel name the surface calls.
    pub name: String,

    /// Human-readable description, used in logs and listings.
    pub description: String,

    handler: Arc<dyn CapabilityHandler>,
}

impl Capability {
    /// Create a descriptor from a handler.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler,
        }
    }

    /// The handler bound to this capability.
    pub fn handler(&self) -> Arc<dyn CapabilityHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Adapter turning an async closure into a [`CapabilityHandler`].
pub struct FnHandler<F> {
    f: F,
}

/// Wrap `f` as a handler.
///
/// ```ignore
/// registry.register("ping", handler_fn(|_| async { Ok(Some(json!("pong"))) }))?;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CapabilityHandler>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

#[async_trait]
impl<F, Fut> CapabilityHandler for FnHandler<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn invoke(&self, argument: Option<Value>) -> HandlerResult {
        (self.f)(argument).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_fn_passes_argument_through() {
        let echo = handler_fn(|arg| async move { Ok(arg) });
        let cap = Capability::new("echo", "returns its argument", echo);

        let out = cap.handler().invoke(Some(json!({"a": 1}))).await.unwrap();
        assert_eq!(out, Some(json!({"a": 1})));

        let none = cap.handler().invoke(None).await.unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_debug_hides_handler() {
        let cap = Capability::new("noop", "does nothing", handler_fn(|_| async { Ok(None) }));
        let shown = format!("{cap:?}");
        assert!(shown.contains("noop"));
        assert!(shown.contains(".."));
    }
}
