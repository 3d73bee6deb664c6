//! BridgeGateway: the sandbox's only window into the privileged process.
//!
//! The gateway:
//! 1. Rejects any call or subscription outside the allow-list before
//!    anything crosses the boundary
//! 2. Correlates each outbound call with its own completion
//! 3. Pumps inbound host messages: replies to their waiters, broadcasts to
//!    the subscriber table
//! 4. Offers typed wrappers for the standard surface (dialogs, filesystem)

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

use super::allow_list::AllowList;
use super::wire::{CallEnvelope, HostMessage, SandboxLink};
use crate::channels;
use crate::error::{BridgeError, BridgeResult};
use crate::events::{EventBus, EventMessage, Subscription};
use crate::rpc::PendingCalls;

/// Sandbox-side handle. Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct BridgeGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    allow_list: Arc<AllowList>,
    pending: PendingCalls,
    /// Taken on `close()` so the host sees the hangup.
    outbound: Mutex<Option<UnboundedSender<CallEnvelope>>>,
    events: Arc<EventBus>,
    closed: AtomicBool,
    /// Shared with the pump, which only holds a `Weak` to the rest.
    shutdown: Arc<Notify>,
}

impl GatewayInner {
    fn mark_closed(&self, reason: &str) {
        self.closed.store(true, Ordering::SeqCst);
        let failed = self.pending.fail_all(reason);
        if failed > 0 {
            log::warn!("[BridgeGateway] {} pending call(s) failed: {}", failed, reason);
        }
    }

    fn unavailable(&self) -> BridgeError {
        BridgeError::BridgeUnavailable("bridge is closed".to_string())
    }
}

impl Drop for GatewayInner {
    /// Last gateway handle gone: the call sender drops with us, stop the pump.
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

impl BridgeGateway {
    /// Attach to the sandbox end of a link and start the inbound pump.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(allow_list: Arc<AllowList>, link: SandboxLink) -> Self {
        let SandboxLink { outbound, inbound } = link;
        let inner = Arc::new(GatewayInner {
            allow_list,
            pending: PendingCalls::new(),
            outbound: Mutex::new(Some(outbound)),
            events: Arc::new(EventBus::new()),
            closed: AtomicBool::new(false),
            shutdown: Arc::new(Notify::new()),
        });
        tokio::spawn(pump(
            Arc::downgrade(&inner),
            Arc::clone(&inner.shutdown),
            inbound,
        ));
        Self { inner }
    }

    /// Issue a named call. `Ok(None)` is the "no selection" sentinel.
    pub async fn call(&self, name: &str, argument: Option<Value>) -> BridgeResult<Option<Value>> {
        self.inner.allow_list.check_call(name)?;
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(self.inner.unavailable());
        }

        let (id, reply) = self.inner.pending.register();
        // Re-check after registering: a concurrent teardown that drained the
        // table before our insert would otherwise leave this waiter orphaned.
        if self.inner.closed.load(Ordering::SeqCst) {
            self.inner.pending.abandon(id);
            return Err(self.inner.unavailable());
        }

        let envelope = CallEnvelope {
            id,
            channel: name.to_string(),
            argument,
        };
        let sent = match self.inner.outbound.lock().as_ref() {
            Some(tx) => tx.send(envelope).is_ok(),
            None => false,
        };
        if !sent {
            self.inner.pending.abandon(id);
            return Err(BridgeError::BridgeUnavailable(
                "privileged process is not reachable".to_string(),
            ));
        }
        log::debug!("[BridgeGateway] {} -> '{}'", id, name);

        match reply.await {
            Ok(result) => result.into_result(),
            Err(_) => Err(BridgeError::BridgeUnavailable(
                "reply channel closed".to_string(),
            )),
        }
    }

    /// Register `handler` on an allow-listed broadcast channel.
    pub fn subscribe<F>(&self, channel: &str, handler: F) -> BridgeResult<Subscription>
    where
        F: Fn(&EventMessage) + Send + Sync + 'static,
    {
        self.inner.allow_list.check_broadcast(channel)?;
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(self.inner.unavailable());
        }
        let id = self.inner.events.on(channel, handler);
        log::debug!("[BridgeGateway] Subscribed {:?} to '{}'", id, channel);
        Ok(Subscription::new(channel.to_string(), id, &self.inner.events))
    }

    /// Pick a directory; resolves to the first selected path.
    pub async fn show_open_directory_dialog(&self) -> BridgeResult<Option<PathBuf>> {
        self.call_for_path(channels::SHOW_OPEN_DIRECTORY_DIALOG).await
    }

    /// Pick a `.png` file; resolves to the first selected path.
    pub async fn show_open_png_dialog(&self) -> BridgeResult<Option<PathBuf>> {
        self.call_for_path(channels::SHOW_OPEN_PNG_DIALOG).await
    }

    /// Choose where to save a `.png`.
    pub async fn show_save_png_dialog(&self) -> BridgeResult<Option<PathBuf>> {
        self.call_for_path(channels::SHOW_SAVE_PNG_DIALOG).await
    }

    pub async fn is_directory(&self, path: impl AsRef<Path>) -> BridgeResult<bool> {
        let arg = Value::String(path.as_ref().to_string_lossy().into_owned());
        match self.call(channels::IS_DIRECTORY, Some(arg)).await? {
            Some(Value::Bool(b)) => Ok(b),
            other => Err(unexpected(channels::IS_DIRECTORY, other)),
        }
    }

    /// Read a whole file through the filesystem gate.
    pub async fn read_file(&self, path: impl AsRef<Path>) -> BridgeResult<Vec<u8>> {
        let arg = Value::String(path.as_ref().to_string_lossy().into_owned());
        match self.call(channels::READ_FILE, Some(arg)).await? {
            Some(Value::String(encoded)) => base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| BridgeError::Protocol(format!("readFile payload: {e}"))),
            other => Err(unexpected(channels::READ_FILE, other)),
        }
    }

    /// Replace a file's contents through the filesystem gate.
    pub async fn write_file(&self, path: impl AsRef<Path>, data: &[u8]) -> BridgeResult<()> {
        let arg = json!({
            "path": path.as_ref().to_string_lossy(),
            "data": base64::engine::general_purpose::STANDARD.encode(data),
        });
        self.call(channels::WRITE_FILE, Some(arg)).await?;
        Ok(())
    }

    /// Tear the connection down.
    ///
    /// Pending calls fail with `BridgeUnavailable`, subscribers are dropped,
    /// and the host sees the hangup. Idempotent.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.outbound.lock().take();
        self.inner.mark_closed("bridge closed");
        self.inner.events.shutdown();
        self.inner.shutdown.notify_one();
        log::debug!("[BridgeGateway] Closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Calls awaiting a reply.
    pub fn in_flight(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner.events.subscriber_count(channel)
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.inner.allow_list
    }

    async fn call_for_path(&self, channel: &str) -> BridgeResult<Option<PathBuf>> {
        match self.call(channel, None).await? {
            None => Ok(None),
            Some(value) => first_path(channel, value),
        }
    }
}

impl std::fmt::Debug for BridgeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeGateway")
            .field("allow_list", &self.inner.allow_list)
            .field("in_flight", &self.inner.pending.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Inbound half: route replies to waiters and broadcasts to subscribers.
///
/// Runs until `close()`, host hangup, or the last gateway handle is dropped.
async fn pump(
    inner: Weak<GatewayInner>,
    shutdown: Arc<Notify>,
    mut inbound: UnboundedReceiver<HostMessage>,
) {
    loop {
        let message = tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            message = inbound.recv() => message,
        };
        let Some(gateway) = inner.upgrade() else {
            break;
        };
        match message {
            Some(HostMessage::Reply { id, result }) => {
                gateway.pending.complete(id, result);
            }
            Some(HostMessage::Event(event)) => {
                let delivered = gateway.events.dispatch(&event);
                log::debug!(
                    "[BridgeGateway] '{}' delivered to {} subscriber(s)",
                    event.channel,
                    delivered
                );
            }
            None => {
                gateway.mark_closed("privileged process disconnected");
                break;
            }
        }
    }
    log::debug!("[BridgeGateway] Pump stopped");
}

/// Scalar path from a dialog reply: a string, or the first entry of an array.
fn first_path(channel: &str, value: Value) -> BridgeResult<Option<PathBuf>> {
    match value {
        Value::String(path) => Ok(Some(PathBuf::from(path))),
        Value::Array(items) => match items.into_iter().next() {
            None => Ok(None),
            Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
            Some(other) => Err(unexpected(channel, Some(other))),
        },
        other => Err(unexpected(channel, Some(other))),
    }
}

fn unexpected(channel: &str, value: Option<Value>) -> BridgeError {
    BridgeError::Protocol(format!(
        "'{}' replied with unexpected value {}",
        channel,
        value.map_or_else(|| "<no selection>".to_string(), |v| v.to_string())
    ))
}
