//! Snapshot of the ambient environment variables the installer reads.
use std::path::{Path, PathBuf};

/// Values read from the process environment.
///
/// Built once with [`HostEnv::detect`] in production; tests construct it
/// directly so nothing ever touches the real user's home directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    /// `HOME`.
    pub home: Option<PathBuf>,
    /// `SHELL`, the user's login shell program.
    pub shell: Option<String>,
    /// `PATH`.
    pub path: Option<String>,
    /// `OSTYPE`, exported by some shells (e.g. `darwin23`).
    pub ostype: Option<String>,
}

impl HostEnv {
    /// Read the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            home: non_empty_var("HOME").map(PathBuf::from),
            shell: non_empty_var("SHELL"),
            path: non_empty_var("PATH"),
            ostype: non_empty_var("OSTYPE"),
        }
    }

    /// Create an environment rooted at `home`, with nothing else set.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
            ..Self::default()
        }
    }

    /// Set the login shell.
    #[must_use]
    pub fn shell(mut self, shell: &str) -> Self {
        self.shell = Some(shell.to_string());
        self
    }

    /// Set `PATH`.
    #[must_use]
    pub fn path_var(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Set `OSTYPE`.
    #[must_use]
    pub fn ostype(mut self, ostype: &str) -> Self {
        self.ostype = Some(ostype.to_string());
        self
    }

    /// Base name of the login shell program (`/bin/zsh` → `zsh`).
    #[must_use]
    pub fn shell_name(&self) -> Option<&str> {
        let shell = self.shell.as_deref()?;
        let name = shell.rsplit('/').next().unwrap_or(shell);
        // Login shells are sometimes reported as `-zsh`.
        let name = name.trim_start_matches('-');
        (!name.is_empty()).then_some(name)
    }

    /// Whether `dir` is one of the entries of `PATH`.
    #[must_use]
    pub fn path_contains(&self, dir: &Path) -> bool {
        self.path.as_deref().is_some_and(|path| {
            std::env::split_paths(path).any(|entry| entry.as_path() == dir)
        })
    }

    /// Expand a leading `~` against `HOME`.
    ///
    /// Returns `None` when the path needs `HOME` and it is unset.
    #[must_use]
    pub fn expand_home(&self, path: &str) -> Option<PathBuf> {
        if path == "~" {
            return self.home.clone();
        }
        match path.strip_prefix("~/") {
            Some(rest) => self.home.as_ref().map(|home| home.join(rest)),
            None => Some(PathBuf::from(path)),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
