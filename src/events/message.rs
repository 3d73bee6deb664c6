//! Broadcast message types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A host-originated notification. Not acknowledged, not persisted.
///
/// The payload sits behind an `Arc` so every subscriber of a fan-out sees the
/// same value without copying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub channel: String,
    pub payload: Arc<Value>,
}

impl EventMessage {
    pub fn new(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            payload: Arc::new(payload),
        }
    }

    /// Decode the payload into a typed structure.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.payload.as_ref())
    }
}

/// Payload of the `timer_tick` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTick {
    pub message: String,
}
