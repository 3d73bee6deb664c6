//! Handle returned by `subscribe`.

use std::sync::{Arc, Weak};

use super::bus::{EventBus, HandlerId};

/// A live registration on a broadcast channel.
///
/// Dropping the handle does not unsubscribe: like the surface it belongs to,
/// a subscription lives until [`release`](Self::release) is called or the
/// bus shuts down.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    id: HandlerId,
    bus: Weak<EventBus>,
}

impl Subscription {
    pub(crate) fn new(channel: String, id: HandlerId, bus: &Arc<EventBus>) -> Self {
        Self {
            channel,
            id,
            bus: Arc::downgrade(bus),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .map_or(false, |bus| bus.is_registered(&self.channel, self.id))
    }

    /// Unsubscribe. Returns `false` if the handler was already gone.
    pub fn release(self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.off(&self.channel, self.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_unregisters() {
        let bus = Arc::new(EventBus::new());
        let id = bus.on("import_png", |_| {});
        let sub = Subscription::new("import_png".into(), id, &bus);

        assert!(sub.is_active());
        assert_eq!(sub.channel(), "import_png");
        assert!(sub.release());
        assert_eq!(bus.subscriber_count("import_png"), 0);
    }

    #[test]
    fn test_release_after_bus_dropped() {
        let bus = Arc::new(EventBus::new());
        let id = bus.on("import_png", |_| {});
        let sub = Subscription::new("import_png".into(), id, &bus);
        drop(bus);

        assert!(!sub.is_active());
        assert!(!sub.release());
    }
}
