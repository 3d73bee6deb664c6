//! Event Broadcast Channel.
//!
//! Host-originated notifications (menu clicks, the startup timer) travel as
//! [`EventMessage`]s from the host's [`EventPublisher`] to the sandbox, where
//! the gateway's pump hands them to the [`EventBus`]. Delivery is
//! fire-and-forget, in registration order per channel, and never replayed to
//! subscribers that attach later.

/// Broadcast message and payload types.
pub mod message;

/// Subscriber table and dispatch.
pub mod bus;

/// Handle returned by `subscribe`.
pub mod subscription;

/// Host-side publisher.
pub mod publisher;

pub use bus::{EventBus, EventHandler, HandlerId};
pub use message::{EventMessage, TimerTick};
pub use publisher::EventPublisher;
pub use subscription::Subscription;
