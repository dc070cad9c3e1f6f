//! Post-install verification
//!
//! Five independent, read-only checks over an installed plugin directory.
//! Each check catches its own I/O and parse failures and reports them as a
//! failed check; the suite never short-circuits, so the report always
//! carries all five verdicts.

use crate::core::{PluginManifest, CONFIG_FILE, MANIFEST_FILE, SCRIPT_ENTRY_MARKER, SCRIPT_FILE};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One check's verdict
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Value,
}

impl CheckOutcome {
    fn passed(name: &str, message: String, details: Value) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message,
            details,
        }
    }

    fn failed(name: &str, message: String, details: Value) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message,
            details,
        }
    }
}

/// Aggregated result of one verification run
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerificationReport {
    pub success: bool,
    pub plugin_directory: PathBuf,
    pub checks: Vec<CheckOutcome>,
    /// Epoch seconds
    pub timestamp: i64,
}

impl VerificationReport {
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn total_count(&self) -> usize {
        self.checks.len()
    }
}

/// Run all five checks over `plugin_dir`.
pub fn verify(plugin_dir: &Path) -> VerificationReport {
    debug!("Verifying installation at {}", plugin_dir.display());

    let checks = vec![
        check_required_files(plugin_dir),
        check_configuration(plugin_dir),
        check_manifest(plugin_dir),
        check_script(plugin_dir),
        check_permissions(plugin_dir),
    ];
    let success = checks.iter().all(|c| c.passed);

    VerificationReport {
        success,
        plugin_directory: plugin_dir.to_path_buf(),
        checks,
        timestamp: chrono::Utc::now().timestamp(),
    }
}

fn check_required_files(plugin_dir: &Path) -> CheckOutcome {
    const NAME: &str = "Required Files";
    let required = [MANIFEST_FILE, SCRIPT_FILE, CONFIG_FILE];

    let mut missing = Vec::new();
    let mut found = Vec::new();
    for file_name in required {
        if plugin_dir.join(file_name).exists() {
            found.push(file_name);
        } else {
            missing.push(file_name);
        }
    }

    if missing.is_empty() {
        CheckOutcome::passed(
            NAME,
            format!("All {} required files present", required.len()),
            json!({ "found": found }),
        )
    } else {
        CheckOutcome::failed(
            NAME,
            format!("Missing files: {}", missing.join(", ")),
            json!({ "missing": missing, "found": found }),
        )
    }
}

fn check_configuration(plugin_dir: &Path) -> CheckOutcome {
    const NAME: &str = "Configuration";
    let config_path = plugin_dir.join(CONFIG_FILE);

    let text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CheckOutcome::failed(NAME, "Configuration file not found".to_string(), json!({}));
        }
        Err(e) => {
            return CheckOutcome::failed(NAME, format!("Error reading configuration: {}", e), json!({}));
        }
    };

    let config: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            return CheckOutcome::failed(
                NAME,
                "Configuration file contains invalid JSON".to_string(),
                json!({}),
            );
        }
    };

    let expected = ["installation_date", "installer_version"];
    let missing: Vec<&str> = expected
        .iter()
        .filter(|field| config.get(**field).is_none())
        .copied()
        .collect();

    if missing.is_empty() {
        CheckOutcome::passed(
            NAME,
            "Configuration is valid".to_string(),
            json!({
                "installer_version": config.get("installer_version"),
                "installation_date": config.get("installation_date"),
            }),
        )
    } else {
        CheckOutcome::failed(
            NAME,
            format!("Configuration missing fields: {}", missing.join(", ")),
            json!({ "missing_fields": missing }),
        )
    }
}

fn check_manifest(plugin_dir: &Path) -> CheckOutcome {
    const NAME: &str = "Mod Definition";
    let manifest_path = plugin_dir.join(MANIFEST_FILE);

    let text = match fs::read_to_string(&manifest_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CheckOutcome::failed(
                NAME,
                "Mod definition file (.ddmod) not found".to_string(),
                json!({}),
            );
        }
        Err(e) => {
            return CheckOutcome::failed(NAME, format!("Error reading mod definition: {}", e), json!({}));
        }
    };

    let manifest: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            return CheckOutcome::failed(
                NAME,
                "Mod definition file contains invalid JSON".to_string(),
                json!({}),
            );
        }
    };

    let required = ["name", "unique_id", "version", "author"];
    let missing: Vec<&str> = required
        .iter()
        .filter(|field| manifest.get(**field).is_none())
        .copied()
        .collect();

    if missing.is_empty() {
        match serde_json::from_value::<PluginManifest>(manifest) {
            Ok(manifest) => CheckOutcome::passed(
                NAME,
                format!("Mod '{}' v{} is valid", manifest.name, manifest.version),
                json!({
                    "name": manifest.name,
                    "version": manifest.version,
                    "unique_id": manifest.unique_id,
                }),
            ),
            Err(_) => CheckOutcome::failed(
                NAME,
                "Mod definition fields have unexpected types".to_string(),
                json!({}),
            ),
        }
    } else {
        CheckOutcome::failed(
            NAME,
            format!("Mod definition missing fields: {}", missing.join(", ")),
            json!({ "missing_fields": missing }),
        )
    }
}

fn check_script(plugin_dir: &Path) -> CheckOutcome {
    const NAME: &str = "GDScript Code";
    let script_path = plugin_dir.join(SCRIPT_FILE);

    let content = match fs::read_to_string(&script_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CheckOutcome::failed(
                NAME,
                format!("GDScript file ({}) not found", SCRIPT_FILE),
                json!({}),
            );
        }
        Err(e) => {
            return CheckOutcome::failed(NAME, format!("Error reading GDScript file: {}", e), json!({}));
        }
    };

    if content.trim().is_empty() {
        return CheckOutcome::failed(
            NAME,
            "GDScript file is empty, missing required start() function".to_string(),
            json!({}),
        );
    }

    if !content.contains(SCRIPT_ENTRY_MARKER) {
        return CheckOutcome::failed(
            NAME,
            "Missing required start() function for Dungeondraft".to_string(),
            json!({}),
        );
    }

    CheckOutcome::passed(
        NAME,
        format!("GDScript file is valid ({} characters)", content.len()),
        json!({
            "file_size": content.len(),
            "line_count": content.lines().count(),
        }),
    )
}

fn check_permissions(plugin_dir: &Path) -> CheckOutcome {
    const NAME: &str = "Permissions";
    let mut issues = Vec::new();

    // Readability is probed by actually opening, which is portable,
    // unlike mode-bit inspection.
    let entries = match fs::read_dir(plugin_dir) {
        Ok(entries) => entries.flatten().collect::<Vec<_>>(),
        Err(_) => {
            return CheckOutcome::failed(
                NAME,
                "Cannot read plugin directory".to_string(),
                json!({ "issues": ["Cannot read plugin directory"] }),
            );
        }
    };

    for entry in entries {
        let path = entry.path();
        if path.is_file() && fs::File::open(&path).is_err() {
            issues.push(format!("Cannot read {}", entry.file_name().to_string_lossy()));
        }
    }

    if issues.is_empty() {
        CheckOutcome::passed(NAME, "All file permissions are correct".to_string(), json!({}))
    } else {
        CheckOutcome::failed(
            NAME,
            format!("Permission issues: {}", issues.join(", ")),
            json!({ "issues": issues }),
        )
    }
}
