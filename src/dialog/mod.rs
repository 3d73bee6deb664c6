//! Dialog Orchestrator and its native backends.
//!
//! ```text
//! showOpenPngDialog
//!   │
//!   ▼
//! DialogCapability ── template DialogRequest (open_png)
//!   │
//!   ▼
//! DialogOrchestrator::run ── validate, resolve default path, modal lock
//!   │  spawn_blocking
//!   ▼
//! NativeDialog (trait)
//!   ├── RfdDialog          (feature `native-dialogs`)
//!   ├── ScriptedDialog     (tests, headless scripting)
//!   └── UnavailableDialog  (no dialog facility)
//! ```

pub mod backend;
#[cfg(feature = "native-dialogs")]
pub mod native;
pub mod orchestrator;
pub mod request;
pub mod scripted;

pub use backend::{DialogSelection, NativeDialog, UnavailableDialog};
#[cfg(feature = "native-dialogs")]
pub use native::RfdDialog;
pub use orchestrator::DialogOrchestrator;
pub use request::{DialogFlags, DialogKind, DialogRequest, FileFilter};
pub use scripted::{ScriptedDialog, ScriptedResponse};
