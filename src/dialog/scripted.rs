//! A dialog backend driven by a queue of canned user responses.
//!
//! Used by tests and by headless runs that want deterministic dialogs. Each
//! `show` pops the next response; an empty queue behaves like the user
//! pressing Cancel.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc;

use parking_lot::Mutex;

use super::backend::{DialogSelection, NativeDialog};
use super::request::DialogRequest;
use crate::error::DialogError;

/// One simulated user interaction.
pub enum ScriptedResponse {
    Select(Vec<PathBuf>),
    Cancel,
    Fail(DialogError),
    /// Stay open until the paired sender supplies a selection or hangs up
    /// (hanging up counts as Cancel).
    Deferred(mpsc::Receiver<DialogSelection>),
}

impl ScriptedResponse {
    pub fn select<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        ScriptedResponse::Select(paths.into_iter().map(Into::into).collect())
    }

    /// A response that blocks until the returned sender is used.
    pub fn deferred() -> (Self, mpsc::Sender<DialogSelection>) {
        let (tx, rx) = mpsc::channel();
        (ScriptedResponse::Deferred(rx), tx)
    }
}

#[derive(Default)]
pub struct ScriptedDialog {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    shown: Mutex<Vec<DialogRequest>>,
}

impl ScriptedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        let dialog = Self::new();
        dialog.responses.lock().extend(responses);
        dialog
    }

    /// Queue another response.
    pub fn push(&self, response: ScriptedResponse) {
        self.responses.lock().push_back(response);
    }

    /// Every request shown so far, in order.
    pub fn shown(&self) -> Vec<DialogRequest> {
        self.shown.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

impl NativeDialog for ScriptedDialog {
    fn name(&self) -> &str {
        "scripted"
    }

    fn show(&self, request: &DialogRequest) -> Result<DialogSelection, DialogError> {
        self.shown.lock().push(request.clone());
        let next = self.responses.lock().pop_front();
        match next {
            Some(ScriptedResponse::Select(paths)) => Ok(Some(paths)),
            Some(ScriptedResponse::Cancel) | None => Ok(None),
            Some(ScriptedResponse::Fail(err)) => Err(err),
            Some(ScriptedResponse::Deferred(rx)) => Ok(rx.recv().unwrap_or(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_in_order_then_cancel() {
        let dialog = ScriptedDialog::with_responses([
            ScriptedResponse::select(["/a"]),
            ScriptedResponse::Fail(DialogError::Failed("x".into())),
        ]);
        let req = DialogRequest::open_directory();

        assert_eq!(dialog.show(&req).unwrap(), Some(vec![PathBuf::from("/a")]));
        assert!(dialog.show(&req).is_err());
        assert_eq!(dialog.show(&req).unwrap(), None);
        assert_eq!(dialog.shown().len(), 3);
        assert_eq!(dialog.remaining(), 0);

        dialog.push(ScriptedResponse::select(["/b", "/c"]));
        assert_eq!(dialog.remaining(), 1);
        assert_eq!(
            dialog.show(&req).unwrap(),
            Some(vec![PathBuf::from("/b"), PathBuf::from("/c")])
        );
    }

    #[test]
    fn test_deferred_hangup_is_cancel() {
        let (response, tx) = ScriptedResponse::deferred();
        let dialog = ScriptedDialog::with_responses([response]);
        drop(tx);
        assert_eq!(dialog.show(&DialogRequest::open_png()).unwrap(), None);
    }
}
