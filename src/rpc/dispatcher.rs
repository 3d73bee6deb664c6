//! Host-side request loop.
//!
//! Reads [`CallEnvelope`]s off the link, resolves each against the frozen
//! [`CapabilityRegistry`], and runs every call on its own task so a handler
//! parked in a modal dialog holds up only its own reply. Handler panics and
//! errors become `CallResult::Failure`; nothing unstructured crosses back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};

use crate::bridge::wire::{CallEnvelope, CallResult, HostMessage};
use crate::capabilities::CapabilityRegistry;
use crate::error::BridgeError;
use crate::events::bus::panic_message;

pub struct CallDispatcher {
    registry: Arc<CapabilityRegistry>,
    outbound: UnboundedSender<HostMessage>,
}

impl CallDispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, outbound: UnboundedSender<HostMessage>) -> Self {
        Self { registry, outbound }
    }

    /// Run the loop on the current Tokio runtime.
    pub fn spawn(self, inbound: UnboundedReceiver<CallEnvelope>) -> JoinHandle<()> {
        tokio::spawn(self.run(inbound))
    }

    /// Serve calls until the sandbox hangs up, then let in-flight calls finish.
    ///
    /// Aborting this future aborts every in-flight call task with it.
    pub async fn run(self, mut inbound: UnboundedReceiver<CallEnvelope>) {
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                envelope = inbound.recv() => {
                    let Some(envelope) = envelope else { break };
                    let registry = Arc::clone(&self.registry);
                    let outbound = self.outbound.clone();
                    in_flight.spawn(async move {
                        let id = envelope.id;
                        let result = serve(&registry, envelope).await;
                        if outbound.send(HostMessage::Reply { id, result }).is_err() {
                            log::debug!("Surface detached before reply to {}", id);
                        }
                    });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        log::error!("[CallDispatcher] Call task failed: {e}");
                    }
                }
            }
        }

        log::debug!(
            "[CallDispatcher] Sandbox hung up; draining {} in-flight call(s)",
            in_flight.len()
        );
        while in_flight.join_next().await.is_some() {}
    }
}

/// Resolve and run a single call.
pub async fn serve(registry: &CapabilityRegistry, envelope: CallEnvelope) -> CallResult {
    let CallEnvelope {
        id,
        channel,
        argument,
    } = envelope;

    let handler = match registry.resolve(&channel) {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("[CallDispatcher] {} rejected: {}", id, e);
            return CallResult::Failure(e);
        }
    };

    let started = Instant::now();
    let result = match AssertUnwindSafe(handler.invoke(argument))
        .catch_unwind()
        .await
    {
        Ok(outcome) => CallResult::from(outcome),
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            log::error!("[CallDispatcher] Handler for '{}' panicked: {}", channel, reason);
            CallResult::Failure(BridgeError::Handler(reason))
        }
    };

    match &result {
        CallResult::Failure(e) => log::warn!(
            "{} '{}' failed after {:?}: {}",
            id,
            channel,
            started.elapsed(),
            e
        ),
        CallResult::NoSelection => {
            log::debug!("{} '{}' -> no selection ({:?})", id, channel, started.elapsed())
        }
        CallResult::Success(_) => {
            log::debug!("{} '{}' -> ok ({:?})", id, channel, started.elapsed())
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::wire::{link, CallId};
    use crate::capabilities::handler_fn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(id: u64, channel: &str, argument: Option<serde_json::Value>) -> CallEnvelope {
        CallEnvelope {
            id: CallId(id),
            channel: channel.to_string(),
            argument,
        }
    }

    #[tokio::test]
    async fn test_unknown_channel_fails_without_running_anything() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                "known",
                handler_fn(move |_| {
                    h.fetch_add(1, Ordering::SeqCst);
                    async { Ok(None) }
                }),
            )
            .unwrap();

        let result = serve(&registry, envelope(1, "nonexistentChannel", None)).await;
        assert_eq!(
            result,
            CallResult::Failure(BridgeError::UnknownCapability("nonexistentChannel".into()))
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_failure() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                "explode",
                handler_fn(|_| async {
                    if true {
                        panic!("kaboom");
                    }
                    Ok(None)
                }),
            )
            .unwrap();

        match serve(&registry, envelope(1, "explode", None)).await {
            CallResult::Failure(BridgeError::Handler(reason)) => assert!(reason.contains("kaboom")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handler_error_and_sentinel_pass_through() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                "reject",
                handler_fn(|_| async { Err(BridgeError::InvalidArgument("bad".into())) }),
            )
            .unwrap();
        registry
            .register("cancel", handler_fn(|_| async { Ok(None) }))
            .unwrap();

        assert_eq!(
            serve(&registry, envelope(1, "reject", None)).await,
            CallResult::Failure(BridgeError::InvalidArgument("bad".into()))
        );
        assert_eq!(
            serve(&registry, envelope(2, "cancel", None)).await,
            CallResult::NoSelection
        );
    }

    #[tokio::test]
    async fn test_run_replies_with_matching_ids() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register("echo", handler_fn(|arg| async move { Ok(arg) }))
            .unwrap();

        let (host, mut sandbox) = link();
        let task = CallDispatcher::new(registry.freeze(), host.outbound).spawn(host.inbound);

        sandbox
            .outbound
            .send(envelope(10, "echo", Some(json!("a"))))
            .unwrap();
        sandbox
            .outbound
            .send(envelope(11, "echo", Some(json!("b"))))
            .unwrap();

        let mut replies = Vec::new();
        for _ in 0..2 {
            match sandbox.inbound.recv().await.unwrap() {
                HostMessage::Reply { id, result } => replies.push((id, result)),
                other => panic!("unexpected: {other:?}"),
            }
        }
        replies.sort_by_key(|(id, _)| *id);
        assert_eq!(replies[0], (CallId(10), CallResult::Success(json!("a"))));
        assert_eq!(replies[1], (CallId(11), CallResult::Success(json!("b"))));

        drop(sandbox.outbound);
        task.await.unwrap();
    }
}
