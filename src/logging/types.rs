//! Core logging types: step entries and status.

/// Step execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct StepEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step completed successfully.
    Ok,
    /// Step was skipped (e.g., `--skip-path`).
    Skipped,
    /// Step ran in dry-run mode; no changes were applied.
    DryRun,
    /// Step failed and aborted the run.
    Failed,
}

impl StepStatus {
    /// Label used for the `status` field of summary events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Inverse of [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Ok, Self::Skipped, Self::DryRun, Self::Failed]
            .into_iter()
            .find(|s| s.label() == label)
    }
}
