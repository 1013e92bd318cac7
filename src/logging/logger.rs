//! Structured logger with dry-run awareness and step summary collection.
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::file::{LogFile, log_file_path};
use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET, STEP_TARGET};
use super::types::{StepEntry, StepStatus};

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages are emitted as [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them on
/// the console and routes them to the run log, if there is one.
#[derive(Debug)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
    file: Option<Arc<LogFile>>,
}

impl Logger {
    /// Create a logger whose run log is `$XDG_CACHE_HOME/mycli/<command>.log`.
    ///
    /// Only the path is resolved here; see [`open_log_file`](Self::open_log_file).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::from_file(log_file_path(command))
    }

    /// Create a logger whose run log is `path`.
    #[must_use]
    pub fn with_log_file(path: PathBuf) -> Self {
        Self::from_file(Some(path))
    }

    /// Create a logger with no run log.
    #[must_use]
    pub fn detached() -> Self {
        Self::from_file(None)
    }

    fn from_file(path: Option<PathBuf>) -> Self {
        Self {
            steps: Mutex::new(Vec::new()),
            file: path.map(|p| Arc::new(LogFile::new(p))),
        }
    }

    pub(super) fn log_file(&self) -> Option<Arc<LogFile>> {
        self.file.clone()
    }

    /// Create the run log and flush what was logged so far into it.
    ///
    /// Called once the installer is committed to acting, so a run that stops
    /// at the platform check leaves no file behind. A log that cannot be
    /// created is reported at debug level and the run continues without it.
    pub fn open_log_file(&self) {
        let Some(file) = &self.file else {
            return;
        };
        let version = option_env!("MYCLI_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let header = format!(
            "# mycli-install {version} {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Err(e) = file.open(&header) {
            self.debug(&format!("no run log at {}: {e}", file.path().display()));
        }
    }

    /// Return a clone of all recorded step entries.
    #[must_use]
    pub fn step_entries(&self) -> Vec<StepEntry> {
        self.steps.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (one per installer step).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a step result for the summary.
    pub fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.steps.lock() {
            guard.push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded step has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.steps
            .lock()
            .is_ok_and(|guard| guard.iter().any(|s| s.status == StepStatus::Failed))
    }

    /// Print the summary of all recorded steps.
    pub fn print_summary(&self) {
        let steps = self.step_entries();
        if steps.is_empty() {
            return;
        }

        self.stage("Summary");
        for step in &steps {
            tracing::info!(
                target: STEP_TARGET,
                status = step.status.label(),
                detail = step.message.as_deref(),
                "{}",
                step.name
            );
        }

        if let Some(file) = self.file.as_ref().filter(|f| f.is_open()) {
            self.info(&format!("log: {}", file.path().display()));
        }
    }
}
