// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed sandbox (fake home, install
// directories, source repository) and hand-written seams so each test can
// run the full install procedure without touching the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::Cell;
use std::path::{Path, PathBuf};

use mycli::config::InstallerConfig;
use mycli::environment::HostEnv;
use mycli::exec::{ExecResult, Executor, SystemExecutor};
use mycli::fetch::{FetchError, Fetcher};
use mycli::installer::{self, Context, Outcome, RunOptions};
use mycli::logging::Logger;
use mycli::platform::{Arch, Os, Platform};

/// Shell script standing in for a working `mycli` release binary.
pub const WORKING_BINARY: &str = "#!/bin/sh\necho \"mycli 0.1.0\"\n";

/// Fetcher that serves fixed content for any URL and counts requests.
#[derive(Debug)]
pub struct StaticFetcher {
    body: String,
    calls: Cell<usize>,
}

impl StaticFetcher {
    /// Serve `body` for every request.
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            calls: Cell::new(0),
        }
    }

    /// Serve [`WORKING_BINARY`].
    pub fn working() -> Self {
        Self::new(WORKING_BINARY)
    }

    /// Number of fetches made.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch_to(&self, _url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        std::fs::write(dest, &self.body)?;
        Ok(self.body.len() as u64)
    }
}

/// Fetcher that behaves like an unreachable host.
#[derive(Debug, Default)]
pub struct UnreachableFetcher {
    calls: Cell<usize>,
}

impl UnreachableFetcher {
    /// Number of fetches attempted.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Fetcher for UnreachableFetcher {
    fn fetch_to(&self, _url: &str, _dest: &Path) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        Err(FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

/// Executor that runs verification for real but stands in for `cargo`.
///
/// `run_in` writes [`WORKING_BINARY`] to `target/release/mycli` in the
/// checkout, the way a release build would. `which` reports the toolchain as
/// installed unless `toolchain` is false.
#[derive(Debug)]
pub struct CargoStub {
    /// Whether the build toolchain is "installed".
    pub toolchain: bool,
    /// Number of builds run.
    pub builds: Cell<usize>,
}

impl Default for CargoStub {
    fn default() -> Self {
        Self {
            toolchain: true,
            builds: Cell::new(0),
        }
    }
}

impl Executor for CargoStub {
    fn run_in(&self, dir: &Path, _program: &str, _args: &[&str]) -> anyhow::Result<ExecResult> {
        self.builds.set(self.builds.get() + 1);
        let release = dir.join("target/release");
        std::fs::create_dir_all(&release)?;
        std::fs::write(release.join("mycli"), WORKING_BINARY)?;
        Ok(ExecResult {
            success: true,
            code: Some(0),
            ..ExecResult::default()
        })
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        SystemExecutor.run_unchecked(program, args)
    }

    fn which(&self, _program: &str) -> bool {
        self.toolchain
    }
}

/// An isolated install environment backed by a [`tempfile::TempDir`].
///
/// Layout under the root:
/// - `home/`           fake `HOME`
/// - `usr-local-bin`   first candidate, never created (so never writable)
/// - `homebrew-bin/`   second candidate, created by [`Sandbox::with_homebrew`]
/// - `home/.local/bin` last resort, created by the installer when needed
/// - `upstream/`       source repository, created by [`Sandbox::with_source_repo`]
pub struct Sandbox {
    /// Temporary root.
    pub root: tempfile::TempDir,
    /// Installer configuration pointing at the sandbox.
    pub config: InstallerConfig,
    /// Environment with `HOME` in the sandbox.
    pub env: HostEnv,
    /// Platform presented to the installer.
    pub platform: Platform,
    /// Logger with no run log and no subscriber.
    pub log: Logger,
}

impl Sandbox {
    /// Apple Silicon macOS, zsh, nothing writable yet.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let home = root.path().join("home");
        std::fs::create_dir_all(&home).expect("create home");

        let config = InstallerConfig {
            install_dirs: vec![
                root.path().join("usr-local-bin").display().to_string(),
                root.path().join("homebrew-bin").display().to_string(),
                "~/.local/bin".to_string(),
            ],
            source_repo: root.path().join("upstream").display().to_string(),
            ..InstallerConfig::default()
        };

        Self {
            env: HostEnv::with_home(&home).shell("/bin/zsh"),
            platform: Platform::new(Os::MacOs, Arch::Arm64),
            log: Logger::detached(),
            root,
            config,
        }
    }

    /// Make the Homebrew candidate exist (and so be writable).
    pub fn with_homebrew(self) -> Self {
        std::fs::create_dir_all(self.homebrew_bin()).expect("create homebrew bin");
        self
    }

    /// Present a different platform.
    pub fn with_platform(mut self, os: Os, arch: Arch) -> Self {
        self.platform = Platform::new(os, arch);
        self
    }

    /// Use a different login shell.
    pub fn with_shell(mut self, shell: &str) -> Self {
        self.env = self.env.shell(shell);
        self
    }

    /// Create a one-commit git repository at the configured source URL.
    pub fn with_source_repo(self) -> Self {
        let dir = self.root.path().join("upstream");
        let repo = git2::Repository::init(&dir).expect("init upstream");
        std::fs::write(dir.join("Cargo.toml"), "[package]\nname = \"mycli\"\n")
            .expect("write Cargo.toml");
        let mut index = repo.index().expect("index");
        index.add_path(Path::new("Cargo.toml")).expect("stage");
        index.write().expect("write index");
        let tree = repo
            .find_tree(index.write_tree().expect("write tree"))
            .expect("find tree");
        let sig = git2::Signature::now("mycli", "mycli@example.com").expect("signature");
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .expect("commit");
        self
    }

    /// Fake `HOME`.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// First candidate, standing in for `/usr/local/bin`.
    pub fn usr_local_bin(&self) -> PathBuf {
        self.root.path().join("usr-local-bin")
    }

    /// Second candidate, standing in for `/opt/homebrew/bin`.
    pub fn homebrew_bin(&self) -> PathBuf {
        self.root.path().join("homebrew-bin")
    }

    /// Last-resort candidate, `~/.local/bin`.
    pub fn local_bin(&self) -> PathBuf {
        self.home().join(".local/bin")
    }

    /// The zsh profile.
    pub fn zshrc(&self) -> PathBuf {
        self.home().join(".zshrc")
    }

    /// Run the installer with the given seams.
    pub fn run(
        &self,
        executor: &dyn Executor,
        fetcher: &dyn Fetcher,
        options: RunOptions,
    ) -> Result<Outcome, mycli::error::InstallError> {
        let ctx = Context {
            config: &self.config,
            platform: &self.platform,
            env: &self.env,
            executor,
            fetcher,
            log: &self.log,
            options,
        };
        installer::run(&ctx)
    }
}

/// Count the export lines in `profile` that mention `dir`.
pub fn export_lines(profile: &Path, dir: &Path) -> usize {
    let content = std::fs::read_to_string(profile).unwrap_or_default();
    let dir = dir.display().to_string();
    content
        .lines()
        .filter(|l| l.starts_with("export PATH=") && l.contains(&dir))
        .count()
}

/// Whether `dir` exists and has no entries.
pub fn is_empty_or_missing(dir: &Path) -> bool {
    std::fs::read_dir(dir).map_or(true, |mut entries| entries.next().is_none())
}
