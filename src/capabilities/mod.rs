//! # Capability Registry
//!
//! The privileged process exposes its operations as named capabilities. Each
//! one is a [`Capability`] descriptor holding a [`CapabilityHandler`]. The
//! [`CapabilityRegistry`] is filled once at startup and frozen before any
//! sandboxed surface exists.
//!
//! ## Resolution Flow
//!
//! 1. Host startup registers the dialog and filesystem capabilities
//! 2. `CapabilityRegistry::freeze()` hands an immutable `Arc` to the dispatcher
//! 3. For every inbound call, `resolve(channel)` returns the handler
//! 4. The dispatcher runs it and converts the outcome into a `CallResult`

pub mod capability;
pub mod registry;

pub use capability::{handler_fn, Capability, CapabilityHandler, FnHandler, HandlerResult};
pub use registry::CapabilityRegistry;
