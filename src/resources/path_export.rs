//! Idempotent PATH export line in a shell profile.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};

/// Comment written above the export line.
pub const MARKER: &str = "# Added by mycli-install";

/// Render the line that prepends `dir` to `PATH`.
#[must_use]
pub fn export_line(dir: &Path) -> String {
    format!("export PATH=\"{}:$PATH\"", dir.display())
}

/// A shell profile that must mention an install directory.
///
/// Presence is a plain substring check on the file contents; the profile's
/// syntax is never validated.
#[derive(Debug, Clone)]
pub struct PathExportResource {
    /// Shell profile file (e.g. `~/.zshrc`).
    pub profile: PathBuf,
    /// Directory to add to `PATH`.
    pub dir: PathBuf,
}

impl PathExportResource {
    /// Create a new PATH export resource.
    #[must_use]
    pub fn new(profile: &Path, dir: &Path) -> Self {
        Self {
            profile: profile.to_path_buf(),
            dir: dir.to_path_buf(),
        }
    }

    fn read_profile(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.profile) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e))
                .with_context(|| format!("read {}", self.profile.display())),
        }
    }
}

impl Resource for PathExportResource {
    fn description(&self) -> String {
        format!("{} in {}", self.dir.display(), self.profile.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(content) = self.read_profile()? else {
            return Ok(ResourceState::Missing);
        };
        if content.contains(self.dir.to_string_lossy().as_ref()) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("{} not mentioned", self.dir.display()),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let existing = self.read_profile()?.unwrap_or_default();

        if let Some(parent) = self.profile.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }

        let mut block = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            block.push('\n');
        }
        block.push('\n');
        block.push_str(MARKER);
        block.push('\n');
        block.push_str(&export_line(&self.dir));
        block.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.profile)
            .with_context(|| format!("open {}", self.profile.display()))?;
        file.write_all(block.as_bytes())
            .with_context(|| format!("append to {}", self.profile.display()))?;

        Ok(ResourceChange::Applied)
    }
}
