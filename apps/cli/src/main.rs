//! Headless driver for the Turbo Loader v3 installer
//!
//! Exposes the same resolve/stage/verify sequence the wizard runs, as
//! subcommands suitable for containers and release gating. Exit code 0
//! means success, 1 means failure (for `verify`: one or more checks
//! failed).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use turbo_installer::core::PLUGIN_DIR_NAME;
use turbo_installer::{
    wizard, ConsoleProgressReporter, GameDetector, InstallOptions, IntoProgressCallback,
    PluginSource, ProgressCallback, StagingRequest,
};

/// Installer and verifier for the Turbo Loader v3 Dungeondraft plugin
#[derive(Parser, Debug)]
#[command(name = "turbo-installer", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect a Dungeondraft installation and the mods folder
    Detect {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Install the plugin into the mods folder
    Install {
        /// Directory holding the plugin payload
        #[arg(long, default_value = "payload")]
        source: PathBuf,

        /// Mods folder override (defaults to the detected location)
        #[arg(long)]
        mods_dir: Option<PathBuf>,

        /// Dungeondraft installation path override
        #[arg(long)]
        dungeondraft_path: Option<PathBuf>,

        /// Do not back up an existing installation
        #[arg(long)]
        no_backup: bool,

        /// Skip post-install verification
        #[arg(long)]
        skip_verify: bool,

        /// Record analytics consent as declined
        #[arg(long)]
        disable_analytics: bool,

        /// Print install log lines as they happen
        #[arg(short, long)]
        verbose: bool,
    },
    /// Verify an installed plugin directory
    Verify {
        /// Plugin directory (defaults to the detected mods folder location)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Detect { json } => detect(json),
        Command::Install {
            source,
            mods_dir,
            dungeondraft_path,
            no_backup,
            skip_verify,
            disable_analytics,
            verbose,
        } => {
            install(
                source,
                mods_dir,
                dungeondraft_path,
                no_backup,
                skip_verify,
                disable_analytics,
                verbose,
            )
            .await
        }
        Command::Verify { dir, json } => verify(dir, json),
    }
}

fn current_detector() -> Option<GameDetector> {
    let detector = GameDetector::for_current_user();
    if detector.is_none() {
        eprintln!("Could not resolve a home directory for the current user");
    }
    detector
}

fn detect(json: bool) -> ExitCode {
    let Some(detector) = current_detector() else {
        return ExitCode::FAILURE;
    };
    let target = detector.detect();

    if json {
        let value = serde_json::json!({
            "dungeondraft_path": target.host_path,
            "detected_version": target.detected_version,
            "mods_path": target.mods_path,
        });
        println!("{}", serde_json::to_string_pretty(&value).expect("report is serializable"));
        return ExitCode::SUCCESS;
    }

    match (&target.host_path, &target.detected_version) {
        (Some(path), Some(version)) => {
            println!("Dungeondraft {} found at {}", version, path.display());
        }
        (Some(path), None) => println!("Dungeondraft found at {}", path.display()),
        _ => println!("Dungeondraft not detected, manual path selection required"),
    }
    println!("Mods folder: {}", target.mods_path.display());
    ExitCode::SUCCESS
}

async fn install(
    source: PathBuf,
    mods_dir: Option<PathBuf>,
    dungeondraft_path: Option<PathBuf>,
    no_backup: bool,
    skip_verify: bool,
    disable_analytics: bool,
    verbose: bool,
) -> ExitCode {
    let target = match mods_dir {
        Some(dir) => (dir, dungeondraft_path),
        None => {
            let Some(detector) = current_detector() else {
                return ExitCode::FAILURE;
            };
            let detected = detector.detect();
            (
                detected.mods_path,
                dungeondraft_path.or(detected.host_path),
            )
        }
    };

    let request = StagingRequest::new(target.0, PluginSource::new(source))
        .with_dungeondraft_path(target.1)
        .with_options(InstallOptions {
            backup_existing: !no_backup,
            verify_after: !skip_verify,
            analytics_enabled: !disable_analytics,
        });

    // The install runs on a background task; this loop is the single
    // consumer of its progress events.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let callback: ProgressCallback = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    let handle = wizard::spawn_install(request, Some(callback));

    let render = ConsoleProgressReporter::new(verbose).into_callback();
    while let Some(event) = rx.recv().await {
        render(event);
    }

    match wizard::await_install(handle).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_recoverable() {
                eprintln!("Installation failed (retry may succeed): {e}");
            } else {
                eprintln!("Installation failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn verify(dir: Option<PathBuf>, json: bool) -> ExitCode {
    let plugin_dir = match dir {
        Some(dir) => dir,
        None => {
            let Some(detector) = current_detector() else {
                return ExitCode::FAILURE;
            };
            detector.mods_dir().join(PLUGIN_DIR_NAME)
        }
    };

    let report = turbo_installer::verify::verify(&plugin_dir);

    if json {
        println!("{}", serde_json::to_string_pretty(&report).expect("report is serializable"));
    } else {
        println!("Turbo Loader v3 - Installation Verification");
        println!("Plugin directory: {}", report.plugin_directory.display());
        for check in &report.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            println!("  {} {}: {}", status, check.name, check.message);
        }
        if report.success {
            println!("Verification successful ({}/{} checks passed)", report.passed_count(), report.total_count());
        } else {
            println!(
                "Verification issues found ({}/{} checks passed)",
                report.passed_count(),
                report.total_count()
            );
        }
    }

    // Strict, unlike the wizard: a failed check fails the process
    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
