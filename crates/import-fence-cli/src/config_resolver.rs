//! Configuration file resolution with global fallback.
//!
//! The configuration file is picked in this order:
//!
//! 1. `--config` flag (explicit path, trusted as-is)
//! 2. `{project}/import-fence.toml` or `{project}/.import-fence.toml`
//! 3. `$IMPORT_FENCE_CONFIG_DIR/config.toml`, else `~/.import-fence/config.toml`
//! 4. nothing: built-in defaults, which forbid nothing

use anyhow::{Context, Result};
use import_fence_py::FenceConfig;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Reads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML. Rule syntax is
    /// checked later, when the rule set is built.
    pub fn load(&self) -> Result<FenceConfig> {
        let Some(p) = self.path() else {
            tracing::debug!("No config file, using defaults");
            return Ok(FenceConfig::default());
        };
        if self.is_global() {
            tracing::info!("Using global config: {}", p.display());
        }
        FenceConfig::from_file(p).with_context(|| format!("Failed to load {}", p.display()))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["import-fence.toml", ".import-fence.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Overrides the global config directory.
const CONFIG_DIR_ENV: &str = "IMPORT_FENCE_CONFIG_DIR";

/// Resolves the configuration file path.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir().as_deref())
}

/// Resolution with the global directory passed in, so tests need no env vars.
fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.is_file() => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Default,
    }
}

/// The global config directory: `$IMPORT_FENCE_CONFIG_DIR`, else `~/.import-fence/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|h| h.join(".import-fence")),
    }
}
