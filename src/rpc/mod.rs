//! Request/Response Channel.
//!
//! The sandbox side keeps a [`PendingCalls`] table correlating each outbound
//! call with its own completion; the host side runs a [`CallDispatcher`] that
//! executes exactly one handler per call and sends exactly one reply.

pub mod dispatcher;
pub mod pending;

pub use dispatcher::{serve, CallDispatcher};
pub use pending::PendingCalls;
