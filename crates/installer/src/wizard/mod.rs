//! Install orchestration and the wizard state machine
//!
//! The wizard is a linear sequence of screens with a single back transition;
//! the install itself runs on a background task and publishes progress
//! events. A staging error terminates the attempt (retry is offered); a
//! failed post-install verification is only a warning and the sequence still
//! completes. The headless `verify` entry point is stricter and exits
//! non-zero for the same condition.

use crate::core::progress::emit;
use crate::core::{InstallerError, ProgressCallback, ProgressEvent, Result};
use crate::detect::GameDetector;
use crate::staging::{self, StagingRequest, StagingResult};
use crate::verify::{self, VerificationReport};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Screens of the install wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Welcome,
    SystemCheck,
    PathSelection,
    Installing,
    Complete,
}

impl WizardStep {
    pub fn next(self) -> WizardStep {
        match self {
            WizardStep::Welcome => WizardStep::SystemCheck,
            WizardStep::SystemCheck => WizardStep::PathSelection,
            WizardStep::PathSelection => WizardStep::Installing,
            WizardStep::Installing => WizardStep::Complete,
            WizardStep::Complete => WizardStep::Complete,
        }
    }

    /// The previous screen, when going back is allowed. `Installing` has no
    /// back transition once started; `Welcome` is the first screen.
    pub fn back(self) -> Option<WizardStep> {
        match self {
            WizardStep::Welcome => None,
            WizardStep::SystemCheck => Some(WizardStep::Welcome),
            WizardStep::PathSelection => Some(WizardStep::SystemCheck),
            WizardStep::Installing => None,
            WizardStep::Complete => None,
        }
    }

    /// Overall wizard progress for the top progress bar
    pub fn progress_percent(self) -> u8 {
        match self {
            WizardStep::Welcome => 0,
            WizardStep::SystemCheck => 25,
            WizardStep::PathSelection => 50,
            WizardStep::Installing => 75,
            WizardStep::Complete => 100,
        }
    }
}

/// Result of the system-prerequisites screen
#[derive(Debug, Clone)]
pub struct SystemCheckReport {
    pub os_supported: bool,
    /// The home directory resolves; staging creates the mods folder itself
    pub mods_location_available: bool,
    pub dungeondraft_detected: bool,
    pub detected_version: Option<String>,
}

impl SystemCheckReport {
    /// Whether the wizard may advance past the system-check screen.
    /// A detection miss does not block; it only forces manual path entry.
    pub fn requirements_met(&self) -> bool {
        self.os_supported && self.mods_location_available
    }

    pub fn manual_path_required(&self) -> bool {
        !self.dungeondraft_detected
    }
}

/// Run the system-prerequisite checks shown on the SystemCheck screen.
pub fn run_system_check(detector: &GameDetector) -> SystemCheckReport {
    let target = detector.detect();
    // Staging creates the mods folder recursively, so the location is
    // available as long as the home directory itself exists.
    let mods_location_available = detector.home().is_dir();

    SystemCheckReport {
        // Platform is a closed enum of the three supported systems
        os_supported: true,
        mods_location_available,
        dungeondraft_detected: target.host_path.is_some(),
        detected_version: target.detected_version,
    }
}

/// Wizard session state: current screen plus the recorded system check.
///
/// Advancing past the system check is gated on its result; everything else
/// is the linear `WizardStep` order.
#[derive(Debug)]
pub struct Wizard {
    step: WizardStep,
    system: Option<SystemCheckReport>,
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Welcome,
            system: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn system_check(&self) -> Option<&SystemCheckReport> {
        self.system.as_ref()
    }

    pub fn record_system_check(&mut self, report: SystemCheckReport) {
        self.system = Some(report);
    }

    /// Try to advance to the next screen. Returns the screen now shown;
    /// a failed prerequisite check keeps the wizard on SystemCheck.
    pub fn advance(&mut self) -> WizardStep {
        let blocked = self.step == WizardStep::SystemCheck
            && !self.system.as_ref().is_some_and(|s| s.requirements_met());
        if !blocked {
            self.step = self.step.next();
        }
        self.step
    }

    /// Go back one screen if the current screen allows it.
    pub fn go_back(&mut self) -> bool {
        match self.step.back() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

/// What a completed install sequence produced
#[derive(Debug)]
pub struct InstallOutcome {
    pub staging: StagingResult,
    /// Present when `verify_after` was set
    pub verification: Option<VerificationReport>,
}

/// Run the install sequence: stage, then optionally verify.
///
/// This is the body of the Installing screen's background task; use
/// [`spawn_install`] to run it off the presentation loop.
pub async fn run_install(
    request: StagingRequest,
    progress: Option<ProgressCallback>,
) -> Result<InstallOutcome> {
    emit(
        &progress,
        ProgressEvent::Log {
            line: "Starting Turbo Loader v3 installation...".to_string(),
        },
    );

    let staging = match staging::stage(&request, progress.clone()).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Installation failed: {e}");
            emit(
                &progress,
                ProgressEvent::Failed {
                    message: format!("Installation failed: {e}"),
                },
            );
            return Err(e);
        }
    };

    let verification = if request.options.verify_after {
        emit(
            &progress,
            ProgressEvent::StepStarted {
                percent: 90,
                status: "Verifying installation...".to_string(),
            },
        );
        let report = verify::verify(&staging.plugin_dir);
        if report.success {
            emit(
                &progress,
                ProgressEvent::Log {
                    line: "Installation verification successful".to_string(),
                },
            );
        } else {
            // Non-fatal: the wizard still reports completion
            emit(
                &progress,
                ProgressEvent::Warning {
                    message: format!(
                        "Installation verification failed ({}/{} checks passed)",
                        report.passed_count(),
                        report.total_count()
                    ),
                },
            );
        }
        Some(report)
    } else {
        None
    };

    emit(
        &progress,
        ProgressEvent::StepStarted {
            percent: 100,
            status: "Installation complete!".to_string(),
        },
    );
    emit(
        &progress,
        ProgressEvent::Completed {
            plugin_dir: staging.plugin_dir.clone(),
        },
    );
    info!("Turbo Loader v3 installed to {}", staging.plugin_dir.display());

    Ok(InstallOutcome {
        staging,
        verification,
    })
}

/// Spawn the install sequence on a background task. The presentation loop
/// stays responsive and consumes `progress` events from its own thread.
pub fn spawn_install(
    request: StagingRequest,
    progress: Option<ProgressCallback>,
) -> JoinHandle<Result<InstallOutcome>> {
    tokio::spawn(run_install(request, progress))
}

/// Join a spawned install, mapping task panics/cancellation into an error.
pub async fn await_install(handle: JoinHandle<Result<InstallOutcome>>) -> Result<InstallOutcome> {
    handle
        .await
        .map_err(|e| InstallerError::TaskFailed { source: e })?
}
