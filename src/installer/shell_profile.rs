//! Shell profile detection and PATH registration.
use std::path::{Path, PathBuf};

use crate::environment::HostEnv;
use crate::error::ProfileError;
use crate::platform::Platform;
use crate::resources::path_export::PathExportResource;
use crate::resources::{Resource as _, ResourceChange};

/// Login shell family, as far as profile selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// zsh
    Zsh,
    /// bash
    Bash,
    /// Anything else, including an unset `SHELL`.
    Other,
}

impl ShellKind {
    /// Classify a shell by the base name of its program.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("zsh") => Self::Zsh,
            Some("bash") => Self::Bash,
            _ => Self::Other,
        }
    }
}

/// Profile file that the user's login shell reads.
///
/// zsh reads `~/.zshrc`. bash reads `~/.bash_profile` on macOS (where
/// terminals start login shells) and `~/.bashrc` elsewhere. Every other
/// shell gets `~/.profile`.
///
/// # Errors
///
/// Returns [`ProfileError::NoHome`] if `HOME` is unset.
pub fn detect_profile(env: &HostEnv, platform: &Platform) -> Result<PathBuf, ProfileError> {
    let home = env.home.as_deref().ok_or(ProfileError::NoHome)?;
    let darwin = platform.is_macos()
        || env
            .ostype
            .as_deref()
            .is_some_and(|t| t.starts_with("darwin"));

    let file = match ShellKind::from_name(env.shell_name()) {
        ShellKind::Zsh => ".zshrc",
        ShellKind::Bash if darwin => ".bash_profile",
        ShellKind::Bash => ".bashrc",
        ShellKind::Other => ".profile",
    };
    Ok(home.join(file))
}

/// Whether `profile` already mentions `dir`.
///
/// # Errors
///
/// Returns [`ProfileError::Update`] if the profile exists but cannot be read.
pub fn is_registered(profile: &Path, dir: &Path) -> Result<bool, ProfileError> {
    PathExportResource::new(profile, dir)
        .needs_change()
        .map(|needs| !needs)
        .map_err(|e| update_error(profile, &e))
}

/// Append an export line for `dir` to `profile` unless the file already
/// mentions `dir`. Returns whether the file changed.
///
/// # Errors
///
/// Returns [`ProfileError::Update`] if the profile cannot be read or
/// appended to.
pub fn register_path(profile: &Path, dir: &Path) -> Result<bool, ProfileError> {
    let change = PathExportResource::new(profile, dir)
        .ensure()
        .map_err(|e| update_error(profile, &e))?;
    Ok(change == ResourceChange::Applied)
}

fn update_error(profile: &Path, e: &anyhow::Error) -> ProfileError {
    ProfileError::Update {
        path: profile.to_path_buf(),
        reason: format!("{e:#}"),
    }
}
