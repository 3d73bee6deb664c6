//! Declarative dialog requests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DialogError;

/// Which native dialog to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    OpenDirectory,
    OpenFile,
    SaveFile,
}

/// A named extension filter, e.g. `png file` / `["png"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn png() -> Self {
        Self::new("png file", &["png"])
    }
}

/// Behavioral switches passed through to the native dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogFlags {
    /// Offer a "new folder" button.
    #[serde(default)]
    pub create_directory: bool,
    /// Ask before replacing an existing file (save only).
    #[serde(default)]
    pub confirm_overwrite: bool,
    /// Allow selecting more than one entry (open only).
    #[serde(default)]
    pub multiple: bool,
}

/// One dialog invocation, consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRequest {
    pub kind: DialogKind,
    pub title: String,
    pub default_path: PathBuf,
    #[serde(default)]
    pub filters: Vec<FileFilter>,
    #[serde(default)]
    pub flags: DialogFlags,
}

impl DialogRequest {
    pub fn new(kind: DialogKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            default_path: PathBuf::from("."),
            filters: Vec::new(),
            flags: DialogFlags::default(),
        }
    }

    /// Directory picker that can create new directories.
    pub fn open_directory() -> Self {
        let mut request = Self::new(DialogKind::OpenDirectory, "Select a directory");
        request.flags.create_directory = true;
        request
    }

    /// Single-file picker restricted to `.png`.
    pub fn open_png() -> Self {
        Self::new(DialogKind::OpenFile, "Select a png image").with_filter(FileFilter::png())
    }

    /// Save target restricted to `.png`, confirming overwrites.
    pub fn save_png() -> Self {
        let mut request =
            Self::new(DialogKind::SaveFile, "Select a png image").with_filter(FileFilter::png());
        request.flags.confirm_overwrite = true;
        request
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_flags(mut self, flags: DialogFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Reject requests no native dialog could honor.
    pub fn validate(&self) -> Result<(), DialogError> {
        if self.kind == DialogKind::OpenDirectory && !self.filters.is_empty() {
            return Err(DialogError::InvalidConfig(
                "directory dialogs take no file filters".into(),
            ));
        }
        if self.flags.confirm_overwrite && self.kind != DialogKind::SaveFile {
            return Err(DialogError::InvalidConfig(
                "confirm_overwrite only applies to save dialogs".into(),
            ));
        }
        if self.flags.multiple && self.kind != DialogKind::OpenFile {
            return Err(DialogError::InvalidConfig(
                "only file open dialogs accept multiple selection".into(),
            ));
        }
        for filter in &self.filters {
            if filter.extensions.is_empty() {
                return Err(DialogError::InvalidConfig(format!(
                    "filter '{}' lists no extensions",
                    filter.name
                )));
            }
            if let Some(bad) = filter
                .extensions
                .iter()
                .find(|e| e.is_empty() || e.contains(['.', '*', '/', '\\']))
            {
                return Err(DialogError::InvalidConfig(format!(
                    "filter '{}' has malformed extension '{}'; use a bare extension like 'png'",
                    filter.name, bad
                )));
            }
        }
        Ok(())
    }

    /// The default path made absolute against the working directory.
    pub fn resolved_default_path(&self) -> Result<PathBuf, DialogError> {
        resolve_against_cwd(&self.default_path)
    }
}

fn resolve_against_cwd(path: &Path) -> Result<PathBuf, DialogError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| DialogError::InvalidConfig(format!("cannot resolve default path: {e}")))?;
    if path == Path::new(".") {
        Ok(cwd)
    } else {
        Ok(cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for request in [
            DialogRequest::open_directory(),
            DialogRequest::open_png(),
            DialogRequest::save_png(),
        ] {
            request.validate().unwrap();
        }
    }

    #[test]
    fn test_preset_flags() {
        assert!(DialogRequest::open_directory().flags.create_directory);
        assert!(DialogRequest::save_png().flags.confirm_overwrite);

        let png = DialogRequest::open_png();
        assert_eq!(png.kind, DialogKind::OpenFile);
        assert_eq!(png.filters, vec![FileFilter::png()]);
        assert_eq!(png.default_path, PathBuf::from("."));
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let dir_with_filter = DialogRequest::open_directory().with_filter(FileFilter::png());
        assert!(matches!(
            dir_with_filter.validate(),
            Err(DialogError::InvalidConfig(_))
        ));

        let dotted = DialogRequest::new(DialogKind::OpenFile, "t")
            .with_filter(FileFilter::new("png", &[".png"]));
        assert!(dotted.validate().is_err());

        let empty = DialogRequest::new(DialogKind::OpenFile, "t")
            .with_filter(FileFilter::new("nothing", &[]));
        assert!(empty.validate().is_err());

        let overwrite_on_open = DialogRequest::open_png().with_flags(DialogFlags {
            confirm_overwrite: true,
            ..DialogFlags::default()
        });
        assert!(overwrite_on_open.validate().is_err());
    }

    #[test]
    fn test_multiple_only_for_file_open() {
        let multi = DialogFlags {
            multiple: true,
            ..DialogFlags::default()
        };
        assert!(DialogRequest::open_png().with_flags(multi).validate().is_ok());

        let folders = DialogRequest::open_directory()
            .with_title("Pick folders")
            .with_flags(multi);
        assert_eq!(folders.title, "Pick folders");
        assert!(matches!(
            folders.validate(),
            Err(DialogError::InvalidConfig(_))
        ));

        let mut save = DialogRequest::save_png();
        save.flags.multiple = true;
        assert!(save.validate().is_err());
    }

    #[test]
    fn test_default_path_resolution() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            DialogRequest::open_png().resolved_default_path().unwrap(),
            cwd
        );
        assert_eq!(
            DialogRequest::open_png()
                .with_default_path("images")
                .resolved_default_path()
                .unwrap(),
            cwd.join("images")
        );

        let abs = std::env::temp_dir();
        assert_eq!(
            DialogRequest::save_png()
                .with_default_path(&abs)
                .resolved_default_path()
                .unwrap(),
            abs
        );
    }
}
