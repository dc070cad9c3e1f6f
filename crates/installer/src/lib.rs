//! Turbo Loader v3 Installer Library
//!
//! This library installs the Turbo Loader v3 plugin into a Dungeondraft
//! mods folder. It detects the game installation, stages the plugin's
//! static files with optional backup of a previous install, writes an
//! installation record, and verifies the result with an independent check
//! suite. Progress is published as events so a wizard screen or a CLI can
//! render it from its own thread.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use turbo_installer::{
//!     GameDetector, InstallOptions, PluginSource, ProgressEvent, StagingRequest,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> turbo_installer::Result<()> {
//! // Propose installation paths for the current user
//! let detector = GameDetector::for_current_user().expect("no home directory");
//! let target = detector.detect();
//!
//! // Describe the install
//! let request = StagingRequest::new(target.mods_path, PluginSource::new("payload"))
//!     .with_dungeondraft_path(target.host_path)
//!     .with_options(InstallOptions::default());
//!
//! // Set up a progress callback (optional)
//! let progress: turbo_installer::ProgressCallback = Arc::new(|event: ProgressEvent| {
//!     if let ProgressEvent::StepStarted { percent, status } = event {
//!         println!("[{percent:>3}%] {status}");
//!     }
//! });
//!
//! // Run the install on a background task
//! let handle = turbo_installer::wizard::spawn_install(request, Some(progress));
//! let outcome = turbo_installer::wizard::await_install(handle).await?;
//! println!("Installed to {}", outcome.staging.plugin_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - **Detection**: Steam convention, Windows uninstall registry, then
//!   conventional per-OS directories; first directory with the game's
//!   executable marker wins
//! - **Staging**: mods-folder creation, timestamped backup, payload copy,
//!   installation record
//! - **Verification**: five independent read-only checks aggregated into a
//!   per-check report
//! - **Wizard**: linear screen state machine plus the background install
//!   sequence with progress events

pub mod core;
pub mod detect;
pub mod staging;
pub mod verify;
pub mod wizard;

// Re-export commonly used types for convenience
pub use crate::core::{
    ConsoleProgressReporter, FileOperation, InstallationRecord, InstallationTarget,
    InstallerError, InstallOptions, IntoProgressCallback, NullProgressReporter, PluginManifest,
    PluginSource, ProgressCallback, ProgressEvent, ProgressReporter, Result,
};
pub use detect::{GameDetector, Platform};
pub use staging::{StagingRequest, StagingResult};
pub use verify::{CheckOutcome, VerificationReport};
pub use wizard::{InstallOutcome, SystemCheckReport, Wizard, WizardStep};
