//! Host-side broadcast publisher.

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::message::EventMessage;
use crate::bridge::wire::HostMessage;

/// Pushes host-originated notifications toward the sandboxed surface.
///
/// `publish` never blocks and never reports delivery: with no subscribers, or
/// with the surface already gone, the message is silently dropped.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    outbound: UnboundedSender<HostMessage>,
}

impl EventPublisher {
    pub fn new(outbound: UnboundedSender<HostMessage>) -> Self {
        Self { outbound }
    }

    /// Fire-and-forget broadcast on `channel`.
    pub fn publish(&self, channel: &str, payload: Value) {
        let message = EventMessage::new(channel, payload);
        if self.outbound.send(HostMessage::Event(message)).is_err() {
            log::debug!("Surface detached; dropped '{}' broadcast", channel);
        } else {
            log::debug!("Published '{}'", channel);
        }
    }

    /// Whether a surface is still attached to the other end.
    pub fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}
