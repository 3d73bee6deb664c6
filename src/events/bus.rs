//! Sandbox-side subscriber table for host broadcasts.
//!
//! Handlers are keyed by channel name and kept in registration order.
//! Dispatch snapshots the handler list for the channel, then calls each
//! handler in order on the caller's task; a panicking handler is logged and
//! the remaining handlers still run. Nothing is buffered: a message
//! dispatched before a handler registers is never shown to that handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::message::EventMessage;

/// A subscriber callback.
pub type EventHandler = Arc<dyn Fn(&EventMessage) + Send + Sync>;

/// Unique identifier for a registered handler.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

static HANDLER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl HandlerId {
    fn next() -> Self {
        Self(HANDLER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone)]
struct HandlerEntry {
    id: HandlerId,
    handler: EventHandler,
}

/// Subscriber table for one sandboxed surface.
#[derive(Default)]
pub struct EventBus {
    /// Handlers keyed by channel, in registration order.
    handlers: RwLock<HashMap<String, Vec<HandlerEntry>>>,

    /// Set once the surface is torn down.
    shutting_down: AtomicBool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `channel`.
    pub fn on(
        &self,
        channel: impl Into<String>,
        handler: impl Fn(&EventMessage) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        let entry = HandlerEntry {
            id,
            handler: Arc::new(handler),
        };
        self.handlers
            .write()
            .entry(channel.into())
            .or_default()
            .push(entry);
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn off(&self, channel: &str, handler_id: HandlerId) -> bool {
        let mut map = self.handlers.write();
        let Some(entries) = map.get_mut(channel) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.id != handler_id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            map.remove(channel);
        }
        removed
    }

    /// Whether `handler_id` is still registered on `channel`.
    pub fn is_registered(&self, channel: &str, handler_id: HandlerId) -> bool {
        self.handlers
            .read()
            .get(channel)
            .map_or(false, |entries| entries.iter().any(|e| e.id == handler_id))
    }

    /// Number of handlers currently registered on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.handlers.read().get(channel).map_or(0, Vec::len)
    }

    /// Deliver `message` to every handler currently registered on its
    /// channel. Returns how many handlers ran to completion.
    pub fn dispatch(&self, message: &EventMessage) -> usize {
        if self.shutting_down.load(Ordering::Acquire) {
            log::debug!(
                "[EventBus] Dropping '{}' broadcast after shutdown",
                message.channel
            );
            return 0;
        }

        // Snapshot so handlers may subscribe or release without deadlocking.
        let entries: Vec<HandlerEntry> = match self.handlers.read().get(&message.channel) {
            Some(v) => v.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for entry in &entries {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                (entry.handler)(message);
            }));
            match result {
                Ok(()) => delivered += 1,
                Err(e) => log::error!(
                    "[EventBus] Handler {:?} on '{}' panicked: {}",
                    entry.id,
                    message.channel,
                    panic_message(e.as_ref())
                ),
            }
        }
        delivered
    }

    /// Drop every handler and ignore further dispatches.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        self.handlers.write().clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.handlers.read();
        let mut counts: Vec<(&str, usize)> =
            map.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        counts.sort_unstable();
        f.debug_struct("EventBus")
            .field("handlers", &counts)
            .field("shutting_down", &self.shutting_down.load(Ordering::Relaxed))
            .finish()
    }
}

/// Best-effort text from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
