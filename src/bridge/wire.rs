//! Messages that cross the trust boundary, and the link that carries them.
//!
//! The two sides share nothing but a pair of unbounded channels:
//!
//! ```text
//! sandbox ── CallEnvelope ──▶ host
//! sandbox ◀── HostMessage ─── host   (Reply | Event)
//! ```
//!
//! Every type here is serde-serializable so a transport between real
//! processes only has to frame the JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::BridgeError;
use crate::events::message::EventMessage;

/// Correlation identifier, unique per gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call#{}", self.0)
    }
}

/// A single outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub id: CallId,
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<Value>,
}

/// The outcome of one call. Exactly one variant, never a value and a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CallResult {
    Success(Value),
    /// "No selection / cancelled". A success, not a failure.
    NoSelection,
    Failure(BridgeError),
}

impl CallResult {
    /// Collapse into the caller-facing shape: `None` is the sentinel.
    pub fn into_result(self) -> Result<Option<Value>, BridgeError> {
        match self {
            CallResult::Success(value) => Ok(Some(value)),
            CallResult::NoSelection => Ok(None),
            CallResult::Failure(err) => Err(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CallResult::Failure(_))
    }
}

impl From<Result<Option<Value>, BridgeError>> for CallResult {
    fn from(result: Result<Option<Value>, BridgeError>) -> Self {
        match result {
            Ok(Some(value)) => CallResult::Success(value),
            Ok(None) => CallResult::NoSelection,
            Err(err) => CallResult::Failure(err),
        }
    }
}

/// Everything the host sends to the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Reply { id: CallId, result: CallResult },
    Event(EventMessage),
}

/// Host end of a link.
#[derive(Debug)]
pub struct HostLink {
    pub inbound: UnboundedReceiver<CallEnvelope>,
    pub outbound: UnboundedSender<HostMessage>,
}

/// Sandbox end of a link.
#[derive(Debug)]
pub struct SandboxLink {
    pub outbound: UnboundedSender<CallEnvelope>,
    pub inbound: UnboundedReceiver<HostMessage>,
}

/// Create a connected pair of link ends.
pub fn link() -> (HostLink, SandboxLink) {
    let (call_tx, call_rx) = mpsc::unbounded_channel();
    let (host_tx, host_rx) = mpsc::unbounded_channel();
    (
        HostLink {
            inbound: call_rx,
            outbound: host_tx,
        },
        SandboxLink {
            outbound: call_tx,
            inbound: host_rx,
        },
    )
}
