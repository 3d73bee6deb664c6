//! Dialog Orchestrator: one request in, one native dialog, one normalized
//! outcome out.
//!
//! | Outcome | Result |
//! |---|---|
//! | user picked something | `Ok(Some(paths))` |
//! | user cancelled, or picked nothing | `Ok(None)` |
//! | dialog could not be shown | `Err(DialogError)` |
//!
//! The backend call is blocking and modal, so it runs on the blocking pool
//! behind an async lock: at most one dialog is open at a time, and calls
//! that do not need a dialog keep flowing.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::backend::{DialogSelection, NativeDialog};
use super::request::{DialogKind, DialogRequest};
use crate::capabilities::{Capability, CapabilityHandler, CapabilityRegistry, HandlerResult};
use crate::channels;
use crate::error::{BridgeResult, DialogError};

pub struct DialogOrchestrator {
    backend: Arc<dyn NativeDialog>,
    default_path: PathBuf,
    modal: Mutex<()>,
}

impl DialogOrchestrator {
    pub fn new(backend: Arc<dyn NativeDialog>) -> Self {
        Self {
            backend,
            default_path: PathBuf::from("."),
            modal: Mutex::new(()),
        }
    }

    /// Starting location for the preset dialogs.
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Show one dialog and wait for the user.
    pub async fn run(&self, request: DialogRequest) -> Result<DialogSelection, DialogError> {
        request.validate()?;
        let mut request = request;
        request.default_path = request.resolved_default_path()?;

        let _modal = self.modal.lock().await;
        let backend = Arc::clone(&self.backend);
        log::debug!(
            "[DialogOrchestrator] Showing {:?} '{}' via {}",
            request.kind,
            request.title,
            backend.name()
        );

        let selection = tokio::task::spawn_blocking(move || backend.show(&request))
            .await
            .map_err(|e| DialogError::Failed(format!("dialog backend crashed: {e}")))??;

        Ok(selection.filter(|paths| !paths.is_empty()))
    }

    /// Bind the three preset dialogs into `registry`.
    pub fn register(self: &Arc<Self>, registry: &mut CapabilityRegistry) -> BridgeResult<()> {
        let presets = [
            (
                channels::SHOW_OPEN_DIRECTORY_DIALOG,
                "Pick a directory",
                DialogRequest::open_directory(),
            ),
            (
                channels::SHOW_OPEN_PNG_DIALOG,
                "Pick a png image to open",
                DialogRequest::open_png(),
            ),
            (
                channels::SHOW_SAVE_PNG_DIALOG,
                "Pick where to save a png image",
                DialogRequest::save_png(),
            ),
        ];

        for (name, description, template) in presets {
            let handler = DialogCapability {
                orchestrator: Arc::clone(self),
                template: template.with_default_path(self.default_path.clone()),
            };
            registry.register_capability(Capability::new(name, description, Arc::new(handler)))?;
        }
        Ok(())
    }
}

struct DialogCapability {
    orchestrator: Arc<DialogOrchestrator>,
    template: DialogRequest,
}

#[async_trait]
impl CapabilityHandler for DialogCapability {
    async fn invoke(&self, _argument: Option<Value>) -> HandlerResult {
        let selection = self.orchestrator.run(self.template.clone()).await?;
        Ok(selection.map(|paths| encode_selection(self.template.kind, paths)))
    }
}

/// Open dialogs reply with an array of paths, save dialogs with one path.
fn encode_selection(kind: DialogKind, paths: Vec<PathBuf>) -> Value {
    let mut names = paths
        .into_iter()
        .map(|p| Value::String(p.to_string_lossy().into_owned()));
    match kind {
        DialogKind::SaveFile => names.next().unwrap_or(Value::Null),
        DialogKind::OpenDirectory | DialogKind::OpenFile => Value::Array(names.collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::backend::UnavailableDialog;
    use crate::dialog::request::FileFilter;
    use crate::dialog::scripted::{ScriptedDialog, ScriptedResponse};
    use crate::error::BridgeError;
    use serde_json::json;

    fn orchestrator(dialog: Arc<ScriptedDialog>) -> Arc<DialogOrchestrator> {
        Arc::new(DialogOrchestrator::new(dialog))
    }

    #[tokio::test]
    async fn test_selection_cancel_and_empty() {
        let dialog = Arc::new(ScriptedDialog::with_responses([
            ScriptedResponse::select(["/pics/a.png"]),
            ScriptedResponse::Cancel,
            ScriptedResponse::Select(vec![]),
        ]));
        let orch = orchestrator(dialog);

        assert_eq!(
            orch.run(DialogRequest::open_png()).await.unwrap(),
            Some(vec![PathBuf::from("/pics/a.png")])
        );
        assert_eq!(orch.run(DialogRequest::open_png()).await.unwrap(), None);
        assert_eq!(orch.run(DialogRequest::open_png()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        let dialog = Arc::new(ScriptedDialog::new());
        let orch = orchestrator(dialog.clone());

        let bad = DialogRequest::open_directory().with_filter(FileFilter::png());
        assert!(matches!(
            orch.run(bad).await,
            Err(DialogError::InvalidConfig(_))
        ));
        assert!(dialog.shown().is_empty());
    }

    #[tokio::test]
    async fn test_backend_sees_absolute_default_path() {
        let dialog = Arc::new(ScriptedDialog::new());
        let orch = orchestrator(dialog.clone());

        orch.run(DialogRequest::open_directory()).await.unwrap();
        let shown = dialog.shown();
        assert!(shown[0].default_path.is_absolute());
    }

    #[tokio::test]
    async fn test_capabilities_encode_by_kind() {
        let dialog = Arc::new(ScriptedDialog::with_responses([
            ScriptedResponse::select(["/d"]),
            ScriptedResponse::select(["/out.png"]),
        ]));
        let orch = orchestrator(dialog.clone());
        let mut registry = CapabilityRegistry::new();
        orch.register(&mut registry).unwrap();
        assert_eq!(registry.len(), 3);

        let dir = registry
            .resolve(channels::SHOW_OPEN_DIRECTORY_DIALOG)
            .unwrap()
            .invoke(None)
            .await
            .unwrap();
        assert_eq!(dir, Some(json!(["/d"])));

        let save = registry
            .resolve(channels::SHOW_SAVE_PNG_DIALOG)
            .unwrap()
            .invoke(None)
            .await
            .unwrap();
        assert_eq!(save, Some(json!("/out.png")));

        let shown = dialog.shown();
        assert_eq!(shown[0].kind, DialogKind::OpenDirectory);
        assert!(shown[1].flags.confirm_overwrite);
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_dialog_error() {
        let orch = Arc::new(DialogOrchestrator::new(Arc::new(UnavailableDialog)));
        let mut registry = CapabilityRegistry::new();
        orch.register(&mut registry).unwrap();

        let err = registry
            .resolve(channels::SHOW_OPEN_PNG_DIALOG)
            .unwrap()
            .invoke(None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Dialog(DialogError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_registering_twice_is_duplicate() {
        let orch = orchestrator(Arc::new(ScriptedDialog::new()));
        let mut registry = CapabilityRegistry::new();
        orch.register(&mut registry).unwrap();
        assert!(matches!(
            orch.register(&mut registry),
            Err(BridgeError::DuplicateCapability(_))
        ));
    }
}
