//! Core types used throughout the installer
//!
//! This module contains the fundamental types that all other modules depend
//! on: the on-disk file names of the plugin, the manifest and installation
//! record shapes, and the payload/source description.

pub mod error;
pub mod progress;

// Re-export main types for convenience
pub use error::{FileOperation, InstallerError, Result};
pub use progress::{
    CompositeProgressReporter, ConsoleProgressReporter, IntoProgressCallback,
    NullProgressReporter, ProgressCallback, ProgressEvent, ProgressReporter,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory created under the mods folder for this plugin
pub const PLUGIN_DIR_NAME: &str = "TurboLoaderV3";

/// The plugin's mod-definition file, consumed by Dungeondraft
pub const MANIFEST_FILE: &str = "TurboLoaderV3.ddmod";

/// The plugin's GDScript entry point
pub const SCRIPT_FILE: &str = "main.gd";

/// Installation record written next to the plugin files
pub const CONFIG_FILE: &str = "config.json";

/// Files staged only when present in the payload
pub const OPTIONAL_FILES: [&str; 3] = ["preview.png", "README.md", "LICENSE"];

/// Dungeondraft's scripting contract: a mod script must define `start()`
pub const SCRIPT_ENTRY_MARKER: &str = "func start(";

/// Version string recorded in `config.json`
pub const INSTALLER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mods folder name under the user's Documents directory
pub const MODS_DIR_NAME: &str = "Dungeondraft Mods";

/// Where the plugin should be installed, as proposed by detection.
///
/// `host_path` is `None` when no Dungeondraft installation was found; the
/// caller must then ask the user for a path. The mods path is always
/// resolvable and is independent of host detection.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallationTarget {
    pub host_path: Option<PathBuf>,
    pub mods_path: PathBuf,
    pub detected_version: Option<String>,
}

/// The plugin's self-description (`.ddmod`), as Dungeondraft reads it.
///
/// Additional keys are permitted on disk and ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub unique_id: String,
    pub version: String,
    pub author: String,
}

/// Record of an installation event, written as `config.json`.
///
/// Overwritten on reinstall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Epoch seconds
    pub installation_date: i64,
    pub installer_version: String,
    pub dungeondraft_path: Option<String>,
    pub analytics_enabled: bool,
    pub auto_update_check: bool,
}

impl InstallationRecord {
    pub fn new(dungeondraft_path: Option<&Path>, analytics_enabled: bool) -> Self {
        Self {
            installation_date: chrono::Utc::now().timestamp(),
            installer_version: INSTALLER_VERSION.to_string(),
            dungeondraft_path: dungeondraft_path.map(|p| p.display().to_string()),
            analytics_enabled,
            auto_update_check: true,
        }
    }
}

/// User-selectable install options (the wizard's checkboxes)
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Rename an existing plugin directory aside before installing
    pub backup_existing: bool,
    /// Run the verification suite after staging
    pub verify_after: bool,
    /// Recorded in `config.json`
    pub analytics_enabled: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            backup_existing: true,
            verify_after: true,
            analytics_enabled: true,
        }
    }
}

/// The shipped plugin file set staged into the mods folder
#[derive(Debug, Clone)]
pub struct PluginSource {
    dir: PathBuf,
}

impl PluginSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files that must exist in the payload for staging to start
    pub fn required_files(&self) -> [PathBuf; 2] {
        [self.dir.join(MANIFEST_FILE), self.dir.join(SCRIPT_FILE)]
    }

    /// Files staged only if the payload carries them
    pub fn optional_files(&self) -> Vec<PathBuf> {
        OPTIONAL_FILES.iter().map(|f| self.dir.join(f)).collect()
    }

    /// Check that every required payload file is present
    pub fn validate(&self) -> Result<()> {
        for path in self.required_files() {
            if !path.is_file() {
                return Err(InstallerError::MissingSource(path));
            }
        }
        Ok(())
    }
}
