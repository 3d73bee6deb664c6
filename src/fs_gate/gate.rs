//! Filesystem Access Gate.
//!
//! The sandbox never holds a filesystem handle. It reaches these primitives
//! only through the allow-listed `is_directory`, `readFile` and `writeFile`
//! calls, and every fault comes back as a structured [`FsError`].

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use crate::capabilities::{Capability, CapabilityHandler, CapabilityRegistry, HandlerResult};
use crate::channels;
use crate::error::{BridgeError, BridgeResult, FsError};

/// Restricted read/write primitives plus the directory predicate.
///
/// With no allowed roots the gate is unrestricted apart from requiring
/// absolute, `..`-free paths.
#[derive(Debug, Clone, Default)]
pub struct FsGate {
    roots: Vec<PathBuf>,
}

impl FsGate {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Confine every primitive to paths under one of `roots`.
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Lexical admission check. Does not touch the filesystem.
    pub fn check(&self, path: &Path) -> Result<(), FsError> {
        if !path.is_absolute() {
            return Err(FsError::InvalidPath(format!(
                "{} is not absolute",
                path.display()
            )));
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(FsError::InvalidPath(format!(
                "{} contains '..'",
                path.display()
            )));
        }
        if !self.roots.is_empty() && !self.roots.iter().any(|root| path.starts_with(root)) {
            return Err(FsError::PermissionDenied(format!(
                "{} is outside the allowed roots",
                path.display()
            )));
        }
        Ok(())
    }

    /// `true` for a directory, `false` for anything else that exists.
    pub async fn is_directory(&self, path: &Path) -> Result<bool, FsError> {
        self.check(path)?;
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FsError::from_io(path, &e))?;
        Ok(metadata.is_dir())
    }

    /// Synchronous whole-file read.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.check(path)?;
        std::fs::read(path).map_err(|e| FsError::from_io(path, &e))
    }

    /// Synchronous whole-file write (create or truncate).
    pub fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.check(path)?;
        std::fs::write(path, data).map_err(|e| FsError::from_io(path, &e))
    }

    /// Bind `is_directory`, `readFile` and `writeFile` into `registry`.
    pub fn register(self: &Arc<Self>, registry: &mut CapabilityRegistry) -> BridgeResult<()> {
        registry.register_capability(Capability::new(
            channels::IS_DIRECTORY,
            "Whether an absolute path names a directory",
            Arc::new(IsDirectory(Arc::clone(self))),
        ))?;
        registry.register_capability(Capability::new(
            channels::READ_FILE,
            "Read a file (base64 reply)",
            Arc::new(ReadFile(Arc::clone(self))),
        ))?;
        registry.register_capability(Capability::new(
            channels::WRITE_FILE,
            "Write a file from base64 data",
            Arc::new(WriteFile(Arc::clone(self))),
        ))?;
        Ok(())
    }
}

struct IsDirectory(Arc<FsGate>);
struct ReadFile(Arc<FsGate>);
struct WriteFile(Arc<FsGate>);

#[derive(Deserialize)]
struct WriteArgs {
    path: PathBuf,
    data: String,
}

fn path_argument(channel: &str, argument: Option<Value>) -> BridgeResult<PathBuf> {
    match argument {
        Some(Value::String(path)) => Ok(PathBuf::from(path)),
        other => Err(BridgeError::InvalidArgument(format!(
            "'{}' expects a path string, got {}",
            channel,
            other.map_or_else(|| "nothing".to_string(), |v| v.to_string())
        ))),
    }
}

#[async_trait]
impl CapabilityHandler for IsDirectory {
    async fn invoke(&self, argument: Option<Value>) -> HandlerResult {
        let path = path_argument(channels::IS_DIRECTORY, argument)?;
        let is_dir = self.0.is_directory(&path).await?;
        Ok(Some(Value::Bool(is_dir)))
    }
}

#[async_trait]
impl CapabilityHandler for ReadFile {
    async fn invoke(&self, argument: Option<Value>) -> HandlerResult {
        let path = path_argument(channels::READ_FILE, argument)?;
        let gate = Arc::clone(&self.0);
        let bytes = tokio::task::spawn_blocking(move || gate.read(&path))
            .await
            .map_err(|e| BridgeError::Handler(format!("read task failed: {e}")))??;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Some(Value::String(encoded)))
    }
}

#[async_trait]
impl CapabilityHandler for WriteFile {
    async fn invoke(&self, argument: Option<Value>) -> HandlerResult {
        let args: WriteArgs = argument
            .ok_or_else(|| BridgeError::InvalidArgument("'writeFile' expects {path, data}".into()))
            .and_then(|v| {
                serde_json::from_value(v)
                    .map_err(|e| BridgeError::InvalidArgument(format!("'writeFile': {e}")))
            })?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(args.data.as_bytes())
            .map_err(|e| BridgeError::InvalidArgument(format!("'writeFile' data: {e}")))?;

        let gate = Arc::clone(&self.0);
        tokio::task::spawn_blocking(move || gate.write(&args.path, &data))
            .await
            .map_err(|e| BridgeError::Handler(format!("write task failed: {e}")))??;
        Ok(Some(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("image.png");
        std::fs::write(&file, b"png").unwrap();
        let gate = FsGate::unrestricted();

        assert!(gate.is_directory(dir.path()).await.unwrap());
        assert!(!gate.is_directory(&file).await.unwrap());
        assert!(matches!(
            gate.is_directory(&dir.path().join("missing")).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_check_rejects_relative_and_traversal() {
        let gate = FsGate::unrestricted();
        assert!(matches!(
            gate.check(Path::new("relative/x")),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(
            gate.check(Path::new("/tmp/../etc/passwd")),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_roots_confine_access() {
        let dir = tempfile::tempdir().unwrap();
        let gate = FsGate::with_roots([dir.path()]);

        let inside = dir.path().join("ok.bin");
        gate.write(&inside, b"hello").unwrap();
        assert_eq!(gate.read(&inside).unwrap(), b"hello");

        let outside = std::env::temp_dir().join("pano-shell-outside-root.bin");
        assert!(matches!(
            gate.write(&outside, b"x"),
            Err(FsError::PermissionDenied(_))
        ));
        assert!(!outside.exists());
    }

    #[tokio::test]
    async fn test_capabilities_round_trip_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(FsGate::unrestricted());
        let mut registry = CapabilityRegistry::new();
        gate.register(&mut registry).unwrap();

        let path = dir.path().join("raw.bin");
        let payload = vec![0u8, 159, 146, 150, 255];
        let encoded = base64::engine::general_purpose::STANDARD.encode(&payload);

        let written = registry
            .resolve(channels::WRITE_FILE)
            .unwrap()
            .invoke(Some(json!({"path": path, "data": encoded})))
            .await
            .unwrap();
        assert_eq!(written, Some(Value::Null));

        let read = registry
            .resolve(channels::READ_FILE)
            .unwrap()
            .invoke(Some(json!(path)))
            .await
            .unwrap();
        assert_eq!(read, Some(Value::String(encoded)));
    }

    #[tokio::test]
    async fn test_argument_shape_errors() {
        let gate = Arc::new(FsGate::unrestricted());
        let mut registry = CapabilityRegistry::new();
        gate.register(&mut registry).unwrap();

        let err = registry
            .resolve(channels::IS_DIRECTORY)
            .unwrap()
            .invoke(Some(json!(42)))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        let err = registry
            .resolve(channels::WRITE_FILE)
            .unwrap()
            .invoke(Some(json!({"path": "/tmp/x", "data": "%%%"})))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }
}
