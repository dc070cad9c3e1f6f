//! Progress tracking and reporting for install operations

use std::path::PathBuf;
use std::sync::Arc;

/// Progress callback for install operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted while an installation is running.
///
/// The install sequence runs on a background task; the presentation surface
/// (wizard screen, CLI print loop) is expected to consume these events from
/// its own single-threaded loop rather than sharing mutable state with the
/// task.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A staging step began; `percent` is overall install progress
    StepStarted {
        percent: u8,
        status: String,
    },
    /// An append-only log line for the install log view
    Log {
        line: String,
    },
    /// A non-fatal problem (e.g. post-install verification failed)
    Warning {
        message: String,
    },
    /// The install sequence finished successfully
    Completed {
        plugin_dir: PathBuf,
    },
    /// The install sequence aborted; retry may be offered
    Failed {
        message: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_step_started(&self, _percent: u8, _status: &str) {}
    fn on_log(&self, _line: &str) {}
    fn on_warning(&self, _message: &str) {}
    fn on_completed(&self, _plugin_dir: &std::path::Path) {}
    fn on_failed(&self, _message: &str) {}
}

/// Extension trait to convert a ProgressReporter into a ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::StepStarted { percent, status } => {
                self.on_step_started(percent, &status);
            }
            ProgressEvent::Log { line } => {
                self.on_log(&line);
            }
            ProgressEvent::Warning { message } => {
                self.on_warning(&message);
            }
            ProgressEvent::Completed { plugin_dir } => {
                self.on_completed(&plugin_dir);
            }
            ProgressEvent::Failed { message } => {
                self.on_failed(&message);
            }
        })
    }
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_step_started(&self, percent: u8, status: &str) {
        println!("[{:>3}%] {}", percent, status);
    }

    fn on_log(&self, line: &str) {
        if self.verbose {
            println!("       {}", line);
        }
    }

    fn on_warning(&self, message: &str) {
        println!("WARN   {}", message);
    }

    fn on_completed(&self, plugin_dir: &std::path::Path) {
        println!("PASS   Installed to {}", plugin_dir.display());
    }

    fn on_failed(&self, message: &str) {
        eprintln!("FAIL   {}", message);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Composite progress reporter that forwards events to multiple reporters
pub struct CompositeProgressReporter {
    reporters: Vec<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for CompositeProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeProgressReporter")
            .field("reporters_count", &self.reporters.len())
            .finish()
    }
}

impl CompositeProgressReporter {
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn add_reporter<R: ProgressReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}

impl Default for CompositeProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CompositeProgressReporter {
    fn on_step_started(&self, percent: u8, status: &str) {
        for reporter in &self.reporters {
            reporter.on_step_started(percent, status);
        }
    }

    fn on_log(&self, line: &str) {
        for reporter in &self.reporters {
            reporter.on_log(line);
        }
    }

    fn on_warning(&self, message: &str) {
        for reporter in &self.reporters {
            reporter.on_warning(message);
        }
    }

    fn on_completed(&self, plugin_dir: &std::path::Path) {
        for reporter in &self.reporters {
            reporter.on_completed(plugin_dir);
        }
    }

    fn on_failed(&self, message: &str) {
        for reporter in &self.reporters {
            reporter.on_failed(message);
        }
    }
}

/// Forward an event to an optional callback
pub(crate) fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}
