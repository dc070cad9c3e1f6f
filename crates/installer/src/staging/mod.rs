//! Staging of plugin files into the mods folder
//!
//! Staging is a fixed step sequence: ensure the mods directory, back up or
//! overwrite an existing plugin directory, copy the payload, then write the
//! installation record. The first filesystem error aborts the remaining
//! steps and is surfaced with path and operation context; files already
//! copied stay in place. There is no rollback — a reinstall with backup
//! enabled recovers safely.

use crate::core::progress::emit;
use crate::core::{
    FileOperation, InstallationRecord, InstallOptions, InstallerError, PluginSource,
    ProgressCallback, ProgressEvent, Result, CONFIG_FILE, MANIFEST_FILE, PLUGIN_DIR_NAME,
    SCRIPT_FILE,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Everything staging needs to run, gathered by the orchestrator
#[derive(Debug, Clone)]
pub struct StagingRequest {
    pub mods_dir: PathBuf,
    pub source: PluginSource,
    /// Recorded in `config.json`; staging itself never touches the game dir
    pub dungeondraft_path: Option<PathBuf>,
    pub options: InstallOptions,
}

impl StagingRequest {
    pub fn new<P: Into<PathBuf>>(mods_dir: P, source: PluginSource) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            source,
            dungeondraft_path: None,
            options: InstallOptions::default(),
        }
    }

    pub fn with_dungeondraft_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.dungeondraft_path = path.map(Into::into);
        self
    }

    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }
}

/// What staging produced, for the completion screen and for tests
#[derive(Debug, Clone)]
pub struct StagingResult {
    pub plugin_dir: PathBuf,
    /// Where a pre-existing installation was moved, if backup ran
    pub backup_dir: Option<PathBuf>,
    /// File names copied into the plugin directory, in copy order
    pub copied_files: Vec<String>,
    pub record: InstallationRecord,
}

/// Stage the plugin payload into `<mods_dir>/TurboLoaderV3/`.
pub async fn stage(
    request: &StagingRequest,
    progress: Option<ProgressCallback>,
) -> Result<StagingResult> {
    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 10,
            status: "Validating paths...".to_string(),
        },
    );
    request.source.validate()?;

    if !request.mods_dir.exists() {
        create_dir_all(&request.mods_dir).await?;
        emit(
            &progress,
            ProgressEvent::Log {
                line: format!("Created mods directory: {}", request.mods_dir.display()),
            },
        );
    }

    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 20,
            status: "Creating plugin directory...".to_string(),
        },
    );

    let plugin_dir = request.mods_dir.join(PLUGIN_DIR_NAME);
    let backup_dir = if plugin_dir.exists() && request.options.backup_existing {
        let backup = backup_path(&request.mods_dir);
        rename(&plugin_dir, &backup).await?;
        emit(
            &progress,
            ProgressEvent::Log {
                line: format!("Backed up existing installation to: {}", backup.display()),
            },
        );
        Some(backup)
    } else {
        None
    };

    create_dir_all(&plugin_dir).await?;
    debug!("Plugin directory ready: {}", plugin_dir.display());

    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 40,
            status: "Copying plugin files...".to_string(),
        },
    );

    let mut copied_files = Vec::new();
    for name in [MANIFEST_FILE, SCRIPT_FILE] {
        copy(&request.source.dir().join(name), &plugin_dir.join(name)).await?;
        copied_files.push(name.to_string());
        emit(
            &progress,
            ProgressEvent::Log {
                line: format!("Copied {}", name),
            },
        );
    }

    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 60,
            status: "Installing supporting files...".to_string(),
        },
    );

    for source_file in request.source.optional_files() {
        if !source_file.is_file() {
            continue;
        }
        // optional_files() only yields paths with a final component
        let Some(name) = source_file.file_name() else {
            continue;
        };
        let name = name.to_string_lossy().into_owned();
        copy(&source_file, &plugin_dir.join(&name)).await?;
        emit(
            &progress,
            ProgressEvent::Log {
                line: format!("Copied {}", name),
            },
        );
        copied_files.push(name);
    }

    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 80,
            status: "Configuring installation...".to_string(),
        },
    );

    let record = InstallationRecord::new(
        request.dungeondraft_path.as_deref(),
        request.options.analytics_enabled,
    );
    write_record(&plugin_dir.join(CONFIG_FILE), &record).await?;
    emit(
        &progress,
        ProgressEvent::Log {
            line: "Created configuration file".to_string(),
        },
    );

    info!(
        "Staged {} file(s) + {} into {}",
        copied_files.len(),
        CONFIG_FILE,
        plugin_dir.display()
    );

    Ok(StagingResult {
        plugin_dir,
        backup_dir,
        copied_files,
        record,
    })
}

/// Timestamp-suffixed sibling name for a backed-up installation.
/// A numeric suffix resolves same-second collisions.
fn backup_path(mods_dir: &Path) -> PathBuf {
    let epoch = chrono::Utc::now().timestamp();
    let mut backup = mods_dir.join(format!("{PLUGIN_DIR_NAME}_backup_{epoch}"));
    let mut attempt = 1;
    while backup.exists() {
        attempt += 1;
        backup = mods_dir.join(format!("{PLUGIN_DIR_NAME}_backup_{epoch}_{attempt}"));
    }
    backup
}

async fn write_record(path: &Path, record: &InstallationRecord) -> Result<()> {
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| InstallerError::RecordEncode { source: e })?;
    fs::write(path, json)
        .await
        .map_err(|e| fs_error(path, FileOperation::Write, e))
}

async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| fs_error(path, FileOperation::CreateDir, e))
}

async fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .await
        .map_err(|e| fs_error(from, FileOperation::Rename, e))
}

async fn copy(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| fs_error(from, FileOperation::Copy, e))
}

fn fs_error(path: &Path, operation: FileOperation, source: std::io::Error) -> InstallerError {
    InstallerError::FileSystem {
        path: path.to_path_buf(),
        operation,
        source,
    }
}
