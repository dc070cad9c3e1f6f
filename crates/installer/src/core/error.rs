//! Error types for the installer with filesystem context

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging or orchestrating an installation.
///
/// Detection misses and failed verification checks are deliberately *not*
/// errors: detection reports absence through an `Option`, and verification
/// converts every internal failure into a failed check (see the `verify`
/// module). Only filesystem and encoding problems surface here.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// File system I/O errors with file context
    #[error("File operation failed on '{}' while {operation}", path.display())]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// A required source file is missing from the plugin payload
    #[error("Required source file missing: '{}'", .0.display())]
    MissingSource(PathBuf),

    /// The installation record could not be encoded as JSON
    #[error("Failed to encode installation record")]
    RecordEncode {
        #[source]
        source: serde_json::Error,
    },

    /// The background install task panicked or was cancelled
    #[error("Install task did not run to completion")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileOperation {
    Read,
    Write,
    Copy,
    Rename,
    Metadata,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Copy => write!(f, "copying"),
            FileOperation::Rename => write!(f, "renaming"),
            FileOperation::Metadata => write!(f, "reading metadata"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

impl InstallerError {
    /// Whether retrying the whole install attempt can plausibly succeed.
    ///
    /// Filesystem errors are retryable (the wizard re-enables its install
    /// button); a missing payload file is not, short of reshipping the
    /// package.
    pub fn is_recoverable(&self) -> bool {
        match self {
            InstallerError::FileSystem { .. } => true,
            InstallerError::MissingSource(_) => false,
            InstallerError::RecordEncode { .. } => false,
            InstallerError::TaskFailed { .. } => true,
        }
    }
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;
