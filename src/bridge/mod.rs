//! Bridge Gateway and the wire it speaks.
//!
//! The gateway is the sandboxed surface's only handle on the privileged
//! process: calls and subscriptions are checked against a fixed
//! [`AllowList`] before anything crosses the [`wire`].

pub mod allow_list;
pub mod gateway;
pub mod wire;

pub use allow_list::AllowList;
pub use gateway::BridgeGateway;
pub use wire::{link, CallEnvelope, CallId, CallResult, HostLink, HostMessage, SandboxLink};
