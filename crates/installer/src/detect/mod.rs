//! Dungeondraft installation detection
//!
//! Detection tries, in priority order: the platform's Steam library
//! convention, the Windows uninstall registry, then a fixed list of
//! conventional install directories. A candidate is accepted iff the
//! platform's executable marker exists under it. Detection never fails;
//! "not found" is an absent `host_path` and the caller falls back to manual
//! path selection.

use crate::core::{InstallationTarget, MODS_DIR_NAME};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Version reported when an installation carries no readable `version.txt`
const DEFAULT_COMPAT_VERSION: &str = "1.1.0.0";

/// Host platform, which fixes the candidate paths and executable marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Relative path of the executable that marks a valid installation
    pub fn executable_marker(self) -> &'static str {
        match self {
            Platform::Windows => "Dungeondraft.exe",
            Platform::MacOs => "Contents/MacOS/Dungeondraft",
            Platform::Linux => "Dungeondraft.x86_64",
        }
    }

    /// Conventional install directories, tried last. `~/` is expanded
    /// against the detector's home directory.
    fn common_install_paths(self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &[
                "C:/Program Files/Dungeondraft",
                "C:/Program Files (x86)/Dungeondraft",
                "C:/Games/Dungeondraft",
                "D:/Games/Dungeondraft",
                "E:/Games/Dungeondraft",
            ],
            Platform::MacOs => &[
                "/Applications/Dungeondraft.app",
                "~/Applications/Dungeondraft.app",
                "/Users/Shared/Applications/Dungeondraft.app",
            ],
            Platform::Linux => &[
                "~/Games/Dungeondraft",
                "/opt/dungeondraft",
                "~/.local/share/applications/Dungeondraft",
                "/usr/local/games/dungeondraft",
            ],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::MacOs => write!(f, "macOS"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}

/// Locates a Dungeondraft installation and the mods folder.
///
/// The home directory is injected rather than read from the environment, so
/// every operation is a pure function of the detector's inputs (tests point
/// it at a scratch directory).
#[derive(Debug, Clone)]
pub struct GameDetector {
    platform: Platform,
    home: PathBuf,
}

impl GameDetector {
    pub fn new<P: Into<PathBuf>>(platform: Platform, home: P) -> Self {
        Self {
            platform,
            home: home.into(),
        }
    }

    /// Detector for the current platform and the current user's home
    /// directory. `None` when the home directory cannot be resolved.
    pub fn for_current_user() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(Platform::current(), home))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Run the full detection sequence.
    pub fn detect(&self) -> InstallationTarget {
        let host_path = self
            .steam_install()
            .or_else(|| self.registry_install())
            .or_else(|| self.conventional_install());

        let detected_version = host_path.as_deref().map(|p| self.read_version(p));
        match &host_path {
            Some(path) => debug!("Detected Dungeondraft at {}", path.display()),
            None => debug!("No Dungeondraft installation found, manual selection required"),
        }

        InstallationTarget {
            host_path,
            mods_path: self.mods_dir(),
            detected_version,
        }
    }

    /// The conventional mods folder under the user's Documents directory.
    ///
    /// Resolution only; creation happens during staging.
    pub fn mods_dir(&self) -> PathBuf {
        self.home.join("Documents").join(MODS_DIR_NAME)
    }

    /// Whether `path` holds a valid installation (executable marker exists).
    /// Also used to validate manually entered paths.
    pub fn is_valid_installation(&self, path: &Path) -> bool {
        path.join(self.platform.executable_marker()).exists()
    }

    /// Version of an installation, read from `version.txt` when present.
    pub fn read_version(&self, install_dir: &Path) -> String {
        match std::fs::read_to_string(install_dir.join("version.txt")) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => DEFAULT_COMPAT_VERSION.to_string(),
        }
    }

    fn steam_install(&self) -> Option<PathBuf> {
        let candidate = self.steam_common_dir()?.join("Dungeondraft");
        if self.is_valid_installation(&candidate) {
            debug!("Found Steam installation: {}", candidate.display());
            Some(candidate)
        } else {
            None
        }
    }

    fn steam_common_dir(&self) -> Option<PathBuf> {
        match self.platform {
            Platform::Windows => self.windows_steam_root().map(|p| p.join("steamapps").join("common")),
            Platform::MacOs => Some(
                self.home
                    .join("Library/Application Support/Steam/steamapps/common"),
            ),
            Platform::Linux => Some(self.home.join(".steam/steam/steamapps/common")),
        }
    }

    #[cfg(windows)]
    fn windows_steam_root(&self) -> Option<PathBuf> {
        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm.open_subkey(r"SOFTWARE\WOW6432Node\Valve\Steam").ok()?;
        let install_path: String = key.get_value("InstallPath").ok()?;
        Some(PathBuf::from(install_path))
    }

    #[cfg(not(windows))]
    fn windows_steam_root(&self) -> Option<PathBuf> {
        None
    }

    /// Scan the Windows uninstall list for a Dungeondraft entry.
    #[cfg(windows)]
    fn registry_install(&self) -> Option<PathBuf> {
        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        if self.platform != Platform::Windows {
            return None;
        }

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let uninstall = hklm
            .open_subkey(r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall")
            .ok()?;

        for subkey_name in uninstall.enum_keys().flatten() {
            let Ok(subkey) = uninstall.open_subkey(&subkey_name) else {
                continue;
            };
            let Ok(display_name) = subkey.get_value::<String, _>("DisplayName") else {
                continue;
            };
            if !display_name.contains("Dungeondraft") {
                continue;
            }
            if let Ok(location) = subkey.get_value::<String, _>("InstallLocation") {
                let path = PathBuf::from(location);
                if self.is_valid_installation(&path) {
                    debug!("Found registry installation: {}", path.display());
                    return Some(path);
                }
            }
        }

        None
    }

    #[cfg(not(windows))]
    fn registry_install(&self) -> Option<PathBuf> {
        None
    }

    fn conventional_install(&self) -> Option<PathBuf> {
        for raw in self.platform.common_install_paths() {
            let candidate = self.expand_home(raw);
            if self.is_valid_installation(&candidate) {
                debug!("Found conventional installation: {}", candidate.display());
                return Some(candidate);
            }
        }
        None
    }

    fn expand_home(&self, raw: &str) -> PathBuf {
        match raw.strip_prefix("~/") {
            Some(rest) => self.home.join(rest),
            None => PathBuf::from(raw),
        }
    }
}
