//! The install procedure: platform gate, acquisition, placement, and PATH
//! registration, run strictly in that order.
//!
//! ```text
//! Start → CheckPlatform → Acquire → Install → RegisterPath → Done
//!              └──────────────┴─────────┴───────────┴──→ Aborted
//! ```
//!
//! Each step runs exactly once. The first failing step aborts the run; the
//! typed error is returned to the command layer, which reports it and exits
//! with [`InstallError::EXIT_CODE`].
pub mod acquire;
pub mod placement;
pub mod shell_profile;
pub mod source_build;
pub mod verify;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::InstallerConfig;
use crate::environment::HostEnv;
use crate::error::{InstallError, PlaceError, PlatformError, ProfileError};
use crate::exec::Executor;
use crate::fetch::Fetcher;
use crate::logging::{Logger, StepStatus};
use crate::platform::{Platform, PlatformTarget};

pub use acquire::{Artifact, Origin};
pub use placement::InstallDir;

/// Flags that change what a run is allowed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Report what would happen without touching the network or disk.
    pub dry_run: bool,
    /// Install the binary but leave the shell profile alone.
    pub skip_path: bool,
}

/// Everything a run needs, passed explicitly so tests can substitute each
/// piece.
pub struct Context<'a> {
    /// Installer configuration.
    pub config: &'a InstallerConfig,
    /// Host platform.
    pub platform: &'a Platform,
    /// Snapshot of `HOME`, `SHELL`, `PATH` and `OSTYPE`.
    pub env: &'a HostEnv,
    /// Process runner (verification and source builds).
    pub executor: &'a dyn Executor,
    /// Network seam for the release download.
    pub fetcher: &'a dyn Fetcher,
    /// Logger for progress output and the step summary.
    pub log: &'a Logger,
    /// Run flags.
    pub options: RunOptions,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("env", &self.env)
            .field("executor", &"<dyn Executor>")
            .field("fetcher", &"<dyn Fetcher>")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Full path of the installed binary (the would-be path on a dry run).
    pub installed: PathBuf,
    /// Where the binary came from; `None` on a dry run.
    pub origin: Option<Origin>,
    /// Output of the binary's version check; `None` on a dry run.
    pub version: Option<String>,
    /// Whether the install directory had to be created.
    pub created_dir: bool,
    /// Shell profile that was checked; `None` with `--skip-path`.
    pub profile: Option<PathBuf>,
    /// Whether an export line was appended to the profile.
    pub profile_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CheckPlatform,
    Acquire,
    Install,
    RegisterPath,
}

impl Step {
    const fn name(self) -> &'static str {
        match self {
            Self::CheckPlatform => "Check platform",
            Self::Acquire => "Acquire binary",
            Self::Install => "Install binary",
            Self::RegisterPath => "Register PATH",
        }
    }
}

/// Run one step: print its header, record its status, and lift its error.
fn run_step<T, E>(
    ctx: &Context<'_>,
    step: Step,
    ok_status: StepStatus,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, InstallError>
where
    E: Into<InstallError> + fmt::Display,
{
    ctx.log.stage(step.name());
    match f() {
        Ok(value) => {
            ctx.log.record_step(step.name(), ok_status, None);
            Ok(value)
        }
        Err(e) => {
            ctx.log
                .record_step(step.name(), StepStatus::Failed, Some(&e.to_string()));
            Err(e.into())
        }
    }
}

/// Fail unless `platform` is one of `supported`.
///
/// # Errors
///
/// Returns [`PlatformError::Unsupported`] naming the detected platform and
/// the supported list.
pub fn check_platform(platform: &Platform, supported: &[PlatformTarget]) -> Result<(), PlatformError> {
    if supported.iter().any(|target| platform.matches(target)) {
        return Ok(());
    }
    let supported = if supported.is_empty() {
        "none".to_string()
    } else {
        supported
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    Err(PlatformError::Unsupported {
        os: platform.os.to_string(),
        arch: platform.arch.to_string(),
        supported,
    })
}

/// Run the whole install procedure.
///
/// # Errors
///
/// Returns the error of the first step that fails. Nothing after the
/// platform gate runs on an unsupported platform.
pub fn run(ctx: &Context<'_>) -> Result<Outcome, InstallError> {
    run_step(ctx, Step::CheckPlatform, StepStatus::Ok, || {
        check_platform(ctx.platform, &ctx.config.supported)
    })?;
    ctx.log.open_log_file();
    ctx.log.info(&format!("platform: {}", ctx.platform));

    if ctx.options.dry_run {
        return preview(ctx);
    }

    let artifact = run_step(ctx, Step::Acquire, StepStatus::Ok, || acquire::acquire(ctx))?;
    let origin = artifact.origin;
    let version = artifact.version.clone();

    let (install_dir, installed) = run_step(ctx, Step::Install, StepStatus::Ok, || {
        install(ctx, artifact)
    })?;

    let (profile, profile_changed) = if ctx.options.skip_path {
        skip_register(ctx);
        (None, false)
    } else {
        run_step(ctx, Step::RegisterPath, StepStatus::Ok, || {
            register(ctx, &install_dir.path)
        })
        .map(|(profile, changed)| (Some(profile), changed))?
    };

    Ok(Outcome {
        installed,
        origin: Some(origin),
        version: Some(version),
        created_dir: install_dir.created,
        profile,
        profile_changed,
    })
}

fn install(ctx: &Context<'_>, artifact: Artifact) -> Result<(InstallDir, PathBuf), PlaceError> {
    let candidates = placement::candidate_dirs(&ctx.config.install_dirs, ctx.env)?;
    let dir = placement::resolve_install_dir(&candidates)?;
    if dir.created {
        ctx.log.info(&format!("created {}", dir.path.display()));
    }
    let installed = placement::place_binary(artifact, &dir.path, &ctx.config.binary_name)?;
    ctx.log.info(&format!("installed {}", installed.display()));
    Ok((dir, installed))
}

fn register(ctx: &Context<'_>, dir: &Path) -> Result<(PathBuf, bool), ProfileError> {
    let profile = shell_profile::detect_profile(ctx.env, ctx.platform)?;
    ctx.log.debug(&format!("shell profile: {}", profile.display()));

    let changed = shell_profile::register_path(&profile, dir)?;
    if changed {
        ctx.log.info(&format!(
            "added {} to PATH in {}",
            dir.display(),
            profile.display()
        ));
        if !ctx.env.path_contains(dir) {
            ctx.log.info(&format!(
                "open a new shell or run `source {}` to pick it up",
                profile.display()
            ));
        }
    } else {
        ctx.log.info(&format!(
            "{} already mentions {}",
            profile.display(),
            dir.display()
        ));
    }
    Ok((profile, changed))
}

fn skip_register(ctx: &Context<'_>) {
    ctx.log.stage(Step::RegisterPath.name());
    ctx.log.info("skipped (--skip-path)");
    ctx.log
        .record_step(Step::RegisterPath.name(), StepStatus::Skipped, Some("--skip-path"));
}

/// Dry-run tail of [`run`]: resolve everything, change nothing.
fn preview(ctx: &Context<'_>) -> Result<Outcome, InstallError> {
    run_step(ctx, Step::Acquire, StepStatus::DryRun, || {
        let url = ctx.config.render_download_url(ctx.platform);
        ctx.log.dry_run(&format!("would download {url}"));
        ctx.log.dry_run(&format!(
            "would verify with `{} {}`",
            ctx.config.binary_name,
            ctx.config.verify_args.join(" ")
        ));
        Ok::<_, InstallError>(())
    })?;

    let (dir, created_dir) = run_step(ctx, Step::Install, StepStatus::DryRun, || {
        let candidates = placement::candidate_dirs(&ctx.config.install_dirs, ctx.env)?;
        let choice = placement::choose_install_dir(&candidates)?;
        let (dir, create) = match choice {
            placement::DirChoice::Writable(dir) => (dir, false),
            placement::DirChoice::CreateLastResort(dir) => {
                ctx.log.dry_run(&format!("would create {}", dir.display()));
                (dir, true)
            }
        };
        ctx.log.dry_run(&format!(
            "would install {}",
            dir.join(&ctx.config.binary_name).display()
        ));
        Ok::<_, PlaceError>((dir, create))
    })?;

    let profile = if ctx.options.skip_path {
        skip_register(ctx);
        None
    } else {
        let profile = run_step(ctx, Step::RegisterPath, StepStatus::DryRun, || {
            let profile = shell_profile::detect_profile(ctx.env, ctx.platform)?;
            if shell_profile::is_registered(&profile, &dir)? {
                ctx.log.dry_run(&format!(
                    "{} already mentions {}",
                    profile.display(),
                    dir.display()
                ));
            } else {
                ctx.log
                    .dry_run(&format!("would append to {}:", profile.display()));
                ctx.log.dry_run(&format!(
                    "  {}",
                    crate::resources::path_export::export_line(&dir)
                ));
            }
            Ok::<_, ProfileError>(profile)
        })?;
        Some(profile)
    };

    Ok(Outcome {
        installed: dir.join(&ctx.config.binary_name),
        origin: None,
        version: None,
        created_dir,
        profile,
        profile_changed: false,
    })
}

/// Shared fakes and fixtures for installer unit tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use anyhow::bail;
    use tempfile::TempDir;

    use super::{Context, RunOptions};
    use crate::config::InstallerConfig;
    use crate::environment::HostEnv;
    use crate::exec::{ExecResult, Executor};
    use crate::fetch::Fetcher;
    use crate::logging::Logger;
    use crate::platform::{Arch, Os, Platform};

    /// Executor that records calls instead of spawning anything real.
    ///
    /// `run_unchecked` answers every verification with `mycli 0.1.0` (or a
    /// non-zero exit when `verify_succeeds` is false). `run_in` simulates a
    /// release build by writing `build_artifact` relative to the working
    /// directory.
    #[derive(Debug)]
    pub struct FakeExecutor {
        /// Value returned by `which()`.
        pub which_result: bool,
        /// Whether verification runs exit 0.
        pub verify_succeeds: bool,
        /// Artifact path written by a simulated build; `None` fails the build.
        pub build_artifact: Option<String>,
        /// Programs passed to `run_unchecked` and `run_in`, in order.
        pub calls: RefCell<Vec<String>>,
        /// Files handed to `run_unchecked`, in order.
        pub verified: RefCell<Vec<PathBuf>>,
        /// Working directories handed to `run_in`, in order.
        pub build_dirs: RefCell<Vec<PathBuf>>,
    }

    impl Default for FakeExecutor {
        fn default() -> Self {
            Self {
                which_result: true,
                verify_succeeds: true,
                build_artifact: Some("target/release/mycli".to_string()),
                calls: RefCell::new(Vec::new()),
                verified: RefCell::new(Vec::new()),
                build_dirs: RefCell::new(Vec::new()),
            }
        }
    }

    impl FakeExecutor {
        /// Programs invoked so far.
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Executor for FakeExecutor {
        fn run_in(&self, dir: &Path, program: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
            self.calls.borrow_mut().push(format!("build:{program}"));
            self.build_dirs.borrow_mut().push(dir.to_path_buf());
            let Some(artifact) = &self.build_artifact else {
                bail!("{program} in {} failed (exit 101: could not compile)", dir.display());
            };
            let out = dir.join(artifact);
            std::fs::create_dir_all(out.parent().unwrap())?;
            std::fs::write(&out, "#!/bin/sh\necho \"mycli 0.1.0\"\n")?;
            Ok(ExecResult {
                success: true,
                code: Some(0),
                ..ExecResult::default()
            })
        }

        fn run_unchecked(&self, program: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
            self.calls.borrow_mut().push(format!("verify:{program}"));
            self.verified.borrow_mut().push(PathBuf::from(program));
            Ok(if self.verify_succeeds {
                ExecResult {
                    stdout: "mycli 0.1.0\n".to_string(),
                    success: true,
                    code: Some(0),
                    ..ExecResult::default()
                }
            } else {
                ExecResult {
                    stderr: "Bad CPU type in executable".to_string(),
                    success: false,
                    code: Some(126),
                    ..ExecResult::default()
                }
            })
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }

    /// Isolated home, install directories, and configuration under one
    /// temporary root.
    ///
    /// `install_dirs` is `[<root>/readonly, <root>/writable, ~/.local/bin]`;
    /// `readonly` does not exist, so it is never writable.
    #[derive(Debug)]
    pub struct Fixture {
        /// Temporary root holding everything else.
        pub root: TempDir,
        /// Installer configuration pointing at the sandbox.
        pub config: InstallerConfig,
        /// Environment with `HOME` inside the sandbox and zsh as the shell.
        pub env: HostEnv,
        /// Apple Silicon macOS.
        pub platform: Platform,
        /// Logger with its run log inside the sandbox (no subscriber, so
        /// nothing but the header reaches the file).
        pub log: Logger,
    }

    impl Fixture {
        /// Create a fresh sandbox.
        pub fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let home = root.path().join("home");
            std::fs::create_dir_all(&home).unwrap();
            std::fs::create_dir_all(root.path().join("writable")).unwrap();

            let config = InstallerConfig {
                install_dirs: vec![
                    root.path().join("readonly").display().to_string(),
                    root.path().join("writable").display().to_string(),
                    "~/.local/bin".to_string(),
                ],
                source_repo: root.path().join("upstream").display().to_string(),
                ..InstallerConfig::default()
            };

            Self {
                env: HostEnv::with_home(&home).shell("/bin/zsh"),
                platform: Platform::new(Os::MacOs, Arch::Arm64),
                log: Logger::with_log_file(root.path().join("cache/install.log")),
                root,
                config,
            }
        }

        /// Path under the sandbox root.
        pub fn path(&self, rel: &str) -> PathBuf {
            self.root.path().join(rel)
        }

        /// `HOME` inside the sandbox.
        pub fn home(&self) -> PathBuf {
            self.path("home")
        }

        /// Create a one-commit git repository at the configured source URL.
        pub fn init_source_repo(&self) {
            let dir = self.path("upstream");
            let repo = git2::Repository::init(&dir).unwrap();
            std::fs::write(dir.join("Cargo.toml"), "[package]\nname = \"mycli\"\n").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("Cargo.toml")).unwrap();
            index.write().unwrap();
            let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
            let sig = git2::Signature::now("mycli", "mycli@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }

        /// Build a run context over this sandbox.
        pub fn ctx<'a>(
            &'a self,
            executor: &'a dyn Executor,
            fetcher: &'a dyn Fetcher,
            options: RunOptions,
        ) -> Context<'a> {
            Context {
                config: &self.config,
                platform: &self.platform,
                env: &self.env,
                executor,
                fetcher,
                log: &self.log,
                options,
            }
        }
    }
}
