//! The seam between the orchestrator and the host's native dialog facility.

use std::path::PathBuf;

use super::request::DialogRequest;
use crate::error::DialogError;

/// What a native dialog returns: `None` when the user dismissed it.
pub type DialogSelection = Option<Vec<PathBuf>>;

/// A native dialog implementation.
///
/// `show` is blocking and modal: it returns only once the user responds.
/// The orchestrator always calls it from the blocking pool.
pub trait NativeDialog: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Show the dialog and wait for the user.
    ///
    /// `request.default_path` has already been resolved to an absolute path.
    fn show(&self, request: &DialogRequest) -> Result<DialogSelection, DialogError>;
}

/// Backend for processes with no dialog facility (headless runs, CI).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDialog;

impl NativeDialog for UnavailableDialog {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn show(&self, request: &DialogRequest) -> Result<DialogSelection, DialogError> {
        Err(DialogError::Unavailable(format!(
            "no native dialog backend for '{}'",
            request.title
        )))
    }
}
