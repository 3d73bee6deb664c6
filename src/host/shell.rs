//! Shell: assembles the privileged side and hands out the sandbox gateway.
//!
//! Launch order: build the registry (dialogs, filesystem gate, extras),
//! verify every allow-listed call has a handler, freeze the registry, open
//! the link, start the dispatcher, then connect the gateway.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::menu::AppMenu;
use super::timer::schedule_tick;
use crate::bridge::{link, AllowList, BridgeGateway};
use crate::capabilities::{Capability, CapabilityRegistry};
use crate::config::ShellConfig;
use crate::dialog::{DialogOrchestrator, NativeDialog, UnavailableDialog};
use crate::error::{BridgeError, BridgeResult};
use crate::events::EventPublisher;
use crate::fs_gate::FsGate;
use crate::rpc::CallDispatcher;

pub struct ShellBuilder {
    config: ShellConfig,
    dialog_backend: Arc<dyn NativeDialog>,
    allow_list: AllowList,
    extra: Vec<Capability>,
}

impl ShellBuilder {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            dialog_backend: Arc::new(UnavailableDialog),
            allow_list: AllowList::standard(),
            extra: Vec::new(),
        }
    }

    pub fn dialog_backend(mut self, backend: Arc<dyn NativeDialog>) -> Self {
        self.dialog_backend = backend;
        self
    }

    /// Replace the standard allow-list.
    pub fn allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Register an additional host capability. It is only reachable from the
    /// surface if its name is also on the allow-list.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.extra.push(capability);
        self
    }

    /// Bring the bridge up. Must run inside a Tokio runtime.
    pub fn launch(self) -> BridgeResult<Shell> {
        tokio::runtime::Handle::try_current().map_err(|_| {
            BridgeError::BridgeUnavailable("shell launch requires a Tokio runtime".to_string())
        })?;

        let mut registry = CapabilityRegistry::new();
        let orchestrator = Arc::new(
            DialogOrchestrator::new(self.dialog_backend)
                .with_default_path(self.config.dialogs.default_path.clone()),
        );
        orchestrator.register(&mut registry)?;
        let gate = Arc::new(FsGate::with_roots(self.config.fs.allowed_roots.clone()));
        gate.register(&mut registry)?;
        for capability in self.extra {
            registry.register_capability(capability)?;
        }

        if let Some(missing) = self.allow_list.calls().find(|name| !registry.contains(name)) {
            return Err(BridgeError::UnknownCapability(missing.to_string()));
        }
        let registry = registry.freeze();

        let (host, sandbox) = link();
        let publisher = EventPublisher::new(host.outbound.clone());
        let dispatcher = CallDispatcher::new(Arc::clone(&registry), host.outbound).spawn(host.inbound);
        let gateway = BridgeGateway::connect(Arc::new(self.allow_list), sandbox);

        log::info!(
            "Shell up: {} capabilities, dialogs via {}",
            registry.len(),
            orchestrator.backend_name()
        );

        Ok(Shell {
            config: self.config,
            registry,
            publisher,
            gateway,
            dispatcher,
            timer: None,
        })
    }
}

/// A running host with its surface attached.
pub struct Shell {
    config: ShellConfig,
    registry: Arc<CapabilityRegistry>,
    publisher: EventPublisher,
    gateway: BridgeGateway,
    dispatcher: JoinHandle<()>,
    timer: Option<JoinHandle<()>>,
}

impl Shell {
    pub fn builder(config: ShellConfig) -> ShellBuilder {
        ShellBuilder::new(config)
    }

    /// The sandbox-side handle.
    pub fn gateway(&self) -> BridgeGateway {
        self.gateway.clone()
    }

    pub fn publisher(&self) -> EventPublisher {
        self.publisher.clone()
    }

    pub fn menu(&self) -> AppMenu {
        AppMenu::new(self.publisher.clone())
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The surface finished loading. Starts the one-shot startup timer.
    pub fn surface_created(&mut self) {
        if !self.config.timer.enabled || self.timer.is_some() {
            return;
        }
        self.timer = Some(schedule_tick(
            self.publisher.clone(),
            self.config.timer.delay(),
            self.config.timer.message.clone(),
        ));
    }

    /// Tear the bridge down. Outstanding calls fail with `BridgeUnavailable`.
    ///
    /// Dropping the shell does the same.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.gateway.close();
        self.dispatcher.abort();
        log::info!("Shell shut down");
    }
}
