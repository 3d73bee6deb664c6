//! # pano-shell
//!
//! Bridge between a privileged desktop host and the sandboxed surface it
//! renders. The surface never touches the filesystem or native dialogs
//! directly: it goes through a [`BridgeGateway`] that only knows a fixed
//! allow-list of named calls and broadcast channels.
//!
//! - [`capabilities`]: named host handlers, frozen before the surface loads
//! - [`bridge`]: allow-list, gateway and the wire between the two sides
//! - [`rpc`]: per-call correlation and the host-side dispatcher
//! - [`events`]: host-to-surface broadcasts
//! - [`dialog`]: modal native file dialogs
//! - [`fs_gate`]: the filesystem primitives the surface may use
//! - [`host`]: menu, startup timer, and [`Shell`] assembly
//!
//! ```no_run
//! use pano_shell::{ScriptedDialog, ScriptedResponse, Shell, ShellConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), pano_shell::BridgeError> {
//! let dialog = Arc::new(ScriptedDialog::with_responses([ScriptedResponse::Cancel]));
//! let shell = Shell::builder(ShellConfig::default())
//!     .dialog_backend(dialog)
//!     .launch()?;
//! let picked = shell.gateway().show_open_png_dialog().await?;
//! assert!(picked.is_none());
//! shell.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod capabilities;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod events;
pub mod fs_gate;
pub mod host;
pub mod rpc;

pub use bridge::{AllowList, BridgeGateway};
pub use capabilities::{handler_fn, Capability, CapabilityHandler, CapabilityRegistry};
pub use config::ShellConfig;
pub use dialog::{DialogOrchestrator, NativeDialog, ScriptedDialog, ScriptedResponse};
pub use error::{BridgeError, BridgeResult, DialogError, FsError};
pub use events::{EventMessage, EventPublisher, Subscription};
pub use fs_gate::FsGate;
pub use host::{AppMenu, MenuCommand, Shell, ShellBuilder};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
