//! Executable file mode for installed binaries.
use anyhow::Result;
#[cfg(unix)]
use anyhow::Context as _;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};

/// Mode given to installed binaries.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// A file that must carry [`EXECUTABLE_MODE`] (Unix only).
#[derive(Debug, Clone)]
pub struct ExecutableResource {
    /// Target file path.
    pub target: PathBuf,
}

impl ExecutableResource {
    /// Create a new executable-mode resource.
    #[must_use]
    pub fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
        }
    }
}

impl Resource for ExecutableResource {
    fn description(&self) -> String {
        format!("{EXECUTABLE_MODE:o} {}", self.target.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.target.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("not a file: {}", self.target.display()),
            });
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let current_mode = std::fs::metadata(&self.target)
                .with_context(|| format!("stat {}", self.target.display()))?
                .permissions()
                .mode()
                & 0o7777;

            if current_mode == EXECUTABLE_MODE {
                Ok(ResourceState::Correct)
            } else {
                Ok(ResourceState::Incorrect {
                    current: format!("{current_mode:o}"),
                })
            }
        }

        #[cfg(not(unix))]
        {
            Ok(ResourceState::Incorrect {
                current: "unknown".to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            std::fs::set_permissions(
                &self.target,
                std::fs::Permissions::from_mode(EXECUTABLE_MODE),
            )
            .with_context(|| format!("set permissions: {}", self.target.display()))?;
            Ok(ResourceChange::Applied)
        }

        #[cfg(not(unix))]
        {
            Ok(ResourceChange::Skipped {
                reason: "file modes not supported on this platform".to_string(),
            })
        }
    }
}
