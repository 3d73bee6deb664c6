//! Native dialogs through the `rfd` crate (feature `native-dialogs`).

use super::backend::{DialogSelection, NativeDialog};
use super::request::{DialogKind, DialogRequest};
use crate::error::DialogError;

/// Platform file dialogs (GTK / Win32 / AppKit).
#[derive(Debug, Default, Clone, Copy)]
pub struct RfdDialog;

impl NativeDialog for RfdDialog {
    fn name(&self) -> &str {
        "rfd"
    }

    fn show(&self, request: &DialogRequest) -> Result<DialogSelection, DialogError> {
        check_supported(request)?;
        let mut dialog = rfd::FileDialog::new()
            .set_title(&request.title)
            .set_directory(&request.default_path)
            .set_can_create_directories(request.flags.create_directory);

        for filter in &request.filters {
            let extensions: Vec<&str> = filter.extensions.iter().map(|s| s.as_str()).collect();
            dialog = dialog.add_filter(&filter.name, &extensions);
        }

        let selection = match request.kind {
            DialogKind::OpenDirectory => dialog.pick_folder().map(|p| vec![p]),
            DialogKind::OpenFile if request.flags.multiple => dialog.pick_files(),
            DialogKind::OpenFile => dialog.pick_file().map(|p| vec![p]),
            DialogKind::SaveFile => dialog.save_file().map(|p| vec![p]),
        };
        Ok(selection)
    }
}

/// rfd save dialogs always confirm before replacing a file.
fn check_supported(request: &DialogRequest) -> Result<(), DialogError> {
    if request.kind == DialogKind::SaveFile && !request.flags.confirm_overwrite {
        return Err(DialogError::InvalidConfig(
            "rfd save dialogs cannot skip overwrite confirmation".into(),
        ));
    }
    Ok(())
}
