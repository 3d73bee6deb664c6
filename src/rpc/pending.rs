//! Correlation table for in-flight calls.
//!
//! Each call owns its own `oneshot` completion keyed by [`CallId`]. A waiter is
//! removed from the table when its reply is delivered, so a result reaches
//! exactly one waiter exactly once, regardless of how many calls to the same
//! channel are in flight.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::oneshot;

use crate::bridge::wire::{CallId, CallResult};
use crate::error::BridgeError;

#[derive(Debug)]
pub struct PendingCalls {
    next_id: AtomicU64,
    waiters: DashMap<CallId, oneshot::Sender<CallResult>>,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            waiters: DashMap::new(),
        }
    }
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and its completion.
    pub fn register(&self) -> (CallId, oneshot::Receiver<CallResult>) {
        let id = CallId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(id, tx);
        (id, rx)
    }

    /// Deliver `result` to the waiter of `id`.
    ///
    /// Returns `false` for unknown or already-completed ids; the result is
    /// dropped in that case.
    pub fn complete(&self, id: CallId, result: CallResult) -> bool {
        match self.waiters.remove(&id) {
            Some((_, tx)) => {
                if tx.send(result).is_err() {
                    log::debug!("Waiter for {} went away before its reply", id);
                }
                true
            }
            None => {
                log::warn!("Dropping reply for unknown or completed {}", id);
                false
            }
        }
    }

    /// Forget a waiter without resolving it.
    pub fn abandon(&self, id: CallId) {
        self.waiters.remove(&id);
    }

    /// Resolve every waiter with `BridgeUnavailable`.
    pub fn fail_all(&self, reason: &str) -> usize {
        let ids: Vec<CallId> = self.waiters.iter().map(|e| *e.key()).collect();
        let mut failed = 0;
        for id in ids {
            if let Some((_, tx)) = self.waiters.remove(&id) {
                let _ = tx.send(CallResult::Failure(BridgeError::BridgeUnavailable(
                    reason.to_string(),
                )));
                failed += 1;
            }
        }
        failed
    }

    /// Number of calls awaiting a reply.
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_out_of_order_completion_routes_by_id() {
        let pending = PendingCalls::new();
        let (first, rx1) = pending.register();
        let (second, rx2) = pending.register();
        assert_ne!(first, second);

        assert!(pending.complete(second, CallResult::Success(json!("two"))));
        assert!(pending.complete(first, CallResult::Success(json!("one"))));

        assert_eq!(rx1.await.unwrap(), CallResult::Success(json!("one")));
        assert_eq!(rx2.await.unwrap(), CallResult::Success(json!("two")));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_second_reply_is_dropped() {
        let pending = PendingCalls::new();
        let (id, rx) = pending.register();

        assert!(pending.complete(id, CallResult::NoSelection));
        assert!(!pending.complete(id, CallResult::Success(json!(1))));
        assert_eq!(rx.await.unwrap(), CallResult::NoSelection);
    }

    #[tokio::test]
    async fn test_fail_all_resolves_waiters() {
        let pending = PendingCalls::new();
        let (_, rx1) = pending.register();
        let (_, rx2) = pending.register();

        assert_eq!(pending.fail_all("host gone"), 2);
        for rx in [rx1, rx2] {
            match rx.await.unwrap() {
                CallResult::Failure(BridgeError::BridgeUnavailable(reason)) => {
                    assert_eq!(reason, "host gone")
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_abandon() {
        let pending = PendingCalls::new();
        let (id, _rx) = pending.register();
        pending.abandon(id);
        assert!(pending.is_empty());
    }
}
