//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors (e.g., [`AcquireError`],
//! [`PlaceError`]) while the command handler at the CLI boundary converts
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! InstallError
//! ├── Platform(PlatformError) - wrong OS or architecture
//! ├── Acquire(AcquireError)   - download, verification, source build
//! ├── Place(PlaceError)       - install directory and binary placement
//! └── Profile(ProfileError)   - shell profile detection and mutation
//! ```
//!
//! Every variant is fatal for the run and maps to exit code
//! [`InstallError::EXIT_CODE`]; the fallback policy decides which acquire
//! errors are recovered before they get this far.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Top-level error type for an installer run.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The host is not a supported OS/architecture combination.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The binary could not be downloaded, verified, or built.
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// The binary could not be placed in an install directory.
    #[error(transparent)]
    Place(#[from] PlaceError),

    /// The shell profile could not be read or updated.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl InstallError {
    /// Process exit code for any failed run.
    pub const EXIT_CODE: u8 = 1;
}

/// Errors from the platform gate.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The host platform is not in the supported list.
    #[error("unsupported platform {os}/{arch} (supported: {supported})")]
    Unsupported {
        /// Detected OS name.
        os: String,
        /// Detected architecture name.
        arch: String,
        /// Comma-separated list of supported targets.
        supported: String,
    },
}

/// Errors from binary acquisition.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The pre-built binary could not be fetched.
    #[error("failed to download {url}: {source}")]
    Download {
        /// URL that was requested.
        url: String,
        /// Underlying fetch failure.
        source: FetchError,
    },

    /// A temporary file for the download could not be created.
    #[error("failed to create temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    /// The artifact did not run successfully with the version flag.
    #[error("verification of {} failed: {reason}", path.display())]
    VerifyFailed {
        /// Path of the artifact that was run.
        path: PathBuf,
        /// Exit status or spawn error.
        reason: String,
    },

    /// The build toolchain needed for the source fallback is not installed.
    #[error("'{tool}' not found on PATH; {hint}")]
    ToolchainMissing {
        /// Program that was looked up.
        tool: String,
        /// Remediation hint shown to the user.
        hint: String,
    },

    /// The source repository could not be cloned.
    #[error("failed to clone {url}: {source}")]
    Clone {
        /// Repository URL.
        url: String,
        /// Underlying libgit2 error.
        source: git2::Error,
    },

    /// The release build did not complete.
    #[error("source build failed: {reason}")]
    BuildFailed {
        /// Captured error output or spawn error.
        reason: String,
    },

    /// The build finished but the expected artifact is absent.
    #[error("build artifact not found at {}", path.display())]
    ArtifactMissing {
        /// Path where the artifact was expected.
        path: PathBuf,
    },
}

/// Errors from install directory resolution and binary placement.
#[derive(Error, Debug)]
pub enum PlaceError {
    /// No candidate directories were configured.
    #[error("no install directories configured")]
    NoCandidates,

    /// A candidate needs `HOME` for `~` expansion and `HOME` is unset.
    #[error("cannot expand '{0}': HOME is not set")]
    NoHome(String),

    /// No candidate is writable, including the last-resort directory.
    #[error("no writable install directory among: {candidates}")]
    NoWritableDir {
        /// Comma-separated list of probed directories.
        candidates: String,
    },

    /// The last-resort directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact could not be moved into place.
    #[error("failed to install {} to {}: {source}", from.display(), to.display())]
    Move {
        /// Artifact path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The installed file could not be made executable.
    #[error("failed to set permissions on {}: {reason}", path.display())]
    Permissions {
        /// Installed binary path.
        path: PathBuf,
        /// Underlying error text.
        reason: String,
    },
}

/// Errors from shell profile handling.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// `HOME` is not set, so the profile path cannot be resolved.
    #[error("HOME is not set; cannot locate shell profile")]
    NoHome,

    /// The profile could not be inspected or the export line could not be
    /// appended.
    #[error("failed to update {}: {reason}", path.display())]
    Update {
        /// Profile path.
        path: PathBuf,
        /// Underlying error chain.
        reason: String,
    },
}
