//! Shell configuration.
//!
//! Loaded from YAML (file named by `PANO_SHELL_CONFIG`, optional), then
//! overridden by environment variables:
//!
//! - `PANO_SHELL_TIMER_DELAY_MS`: delay before the `timer_tick` broadcast
//! - `PANO_SHELL_FS_ROOTS`: allowed filesystem roots, `PATH`-style list
//!
//! ```yaml
//! window:
//!   width: 1080
//!   height: 1080
//! timer:
//!   delay_ms: 1000
//!   message: "surface ready"
//! dialogs:
//!   default_path: "."
//! fs:
//!   allowed_roots: ["/home/me/panoramas"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "PANO_SHELL_CONFIG";
pub const TIMER_DELAY_ENV: &str = "PANO_SHELL_TIMER_DELAY_MS";
pub const FS_ROOTS_ENV: &str = "PANO_SHELL_FS_ROOTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub window: WindowConfig,
    pub timer: TimerConfig,
    pub dialogs: DialogConfig,
    pub fs: FsConfig,
}

/// Window geometry. Informational for the bridge; the window itself is glue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            title: "pano".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub enabled: bool,
    pub delay_ms: u64,
    pub message: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 1000,
            message: "surface ready".to_string(),
        }
    }
}

impl TimerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub default_path: PathBuf,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Empty means unrestricted.
    pub allowed_roots: Vec<PathBuf>,
}

impl ShellConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// File named by `PANO_SHELL_CONFIG` (or defaults), then env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the environment, in production).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(TIMER_DELAY_ENV) {
            self.timer.delay_ms = raw.trim().parse().map_err(|e| {
                ConfigError::Invalid(format!("{TIMER_DELAY_ENV}={raw:?}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(FS_ROOTS_ENV) {
            self.fs.allowed_roots = std::env::split_paths(&raw)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = self.fs.allowed_roots.iter().find(|r| !r.is_absolute()) {
            return Err(ConfigError::Invalid(format!(
                "fs.allowed_roots entry {} is not absolute",
                root.display()
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}
