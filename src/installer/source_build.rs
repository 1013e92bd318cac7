//! Source-build fallback: clone, release build, copy the artifact out.
use std::path::Path;

use git2::build::RepoBuilder;
use tempfile::TempPath;

use super::Context;
use super::acquire::{Artifact, Origin};
use super::verify;
use crate::error::AcquireError;

/// Clone the source repository and build the binary with the configured
/// toolchain.
///
/// The checkout lives in a temporary directory that is removed when this
/// function returns, whatever the outcome. The produced binary is copied to
/// its own temporary file and verified like a download.
///
/// # Errors
///
/// - [`AcquireError::ToolchainMissing`] if the build program is not on PATH
/// - [`AcquireError::Clone`] if the repository cannot be cloned
/// - [`AcquireError::BuildFailed`] if the build exits non-zero or the built
///   binary fails verification
/// - [`AcquireError::ArtifactMissing`] if the build left no artifact
pub fn build_from_source(ctx: &Context<'_>) -> Result<Artifact, AcquireError> {
    let build = &ctx.config.build;
    if !ctx.executor.which(&build.program) {
        return Err(AcquireError::ToolchainMissing {
            tool: build.program.clone(),
            hint: build.hint.clone(),
        });
    }

    let workdir = tempfile::Builder::new()
        .prefix(&format!("{}-src-", ctx.config.binary_name))
        .tempdir()
        .map_err(AcquireError::TempFile)?;
    let checkout = workdir.path().join("src");

    ctx.log.info(&format!("cloning {}", ctx.config.source_repo));
    clone(
        &ctx.config.source_repo,
        ctx.config.source_ref.as_deref(),
        &checkout,
    )?;

    ctx.log
        .info(&format!("running {} {}", build.program, build.args.join(" ")));
    let args: Vec<&str> = build.args.iter().map(String::as_str).collect();
    ctx.executor
        .run_in(&checkout, &build.program, &args)
        .map_err(|e| AcquireError::BuildFailed {
            reason: format!("{e:#}"),
        })?;

    let built = checkout.join(ctx.config.build_artifact());
    if !built.is_file() {
        return Err(AcquireError::ArtifactMissing { path: built });
    }
    let path = copy_to_temp(&built, &ctx.config.binary_name)?;

    let version = verify::verify_binary(ctx.executor, &path, &ctx.config.verify_args).map_err(
        |e| AcquireError::BuildFailed {
            reason: format!("built binary is unusable: {e}"),
        },
    )?;
    ctx.log.info(&format!("built and verified: {version}"));

    Ok(Artifact {
        path,
        origin: Origin::SourceBuild,
        version,
    })
}

/// Clone `url` into `dest`, checking out `branch` when given.
fn clone(url: &str, branch: Option<&str>, dest: &Path) -> Result<(), AcquireError> {
    let mut builder = RepoBuilder::new();
    if let Some(branch) = branch {
        builder.branch(branch);
    }
    builder
        .clone(url, dest)
        .map(drop)
        .map_err(|source| AcquireError::Clone {
            url: url.to_string(),
            source,
        })
}

/// Copy `built` out of the checkout so it survives the checkout's removal.
fn copy_to_temp(built: &Path, name: &str) -> Result<TempPath, AcquireError> {
    let path = tempfile::Builder::new()
        .prefix(&format!("{name}-"))
        .suffix(".build")
        .tempfile()
        .map_err(AcquireError::TempFile)?
        .into_temp_path();
    std::fs::copy(built, &path).map_err(AcquireError::TempFile)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;
    use crate::installer::RunOptions;
    use crate::installer::test_helpers::{FakeExecutor, Fixture};

    #[test]
    fn builds_from_local_repository() {
        let fx = Fixture::new();
        fx.init_source_repo();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor::default();

        let artifact =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap();

        assert_eq!(artifact.origin, Origin::SourceBuild);
        assert!(artifact.path.exists());
        assert_eq!(
            std::fs::read_to_string(&artifact.path).unwrap(),
            "#!/bin/sh\necho \"mycli 0.1.0\"\n"
        );
        assert_eq!(
            executor.calls().first().map(String::as_str),
            Some("build:cargo")
        );
    }

    #[test]
    fn checkout_is_removed_after_successful_build() {
        let fx = Fixture::new();
        fx.init_source_repo();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor::default();

        let artifact =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap();

        let checkout = executor.build_dirs.borrow().first().cloned().unwrap();
        let workdir = checkout.parent().unwrap();
        assert!(
            workdir
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("mycli-src-")
        );
        assert!(!workdir.exists());

        let built = artifact.path.to_path_buf();
        assert!(built.to_string_lossy().ends_with(".build"));
        assert!(built.exists());
        drop(artifact);
        assert!(!built.exists());
    }

    #[test]
    fn unusable_build_leaves_no_temporaries() {
        let fx = Fixture::new();
        fx.init_source_repo();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor {
            verify_succeeds: false,
            ..FakeExecutor::default()
        };

        let err =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap_err();

        assert!(
            matches!(&err, AcquireError::BuildFailed { reason } if reason.starts_with("built binary is unusable")),
            "{err}"
        );
        let built = executor.verified.borrow().first().cloned().unwrap();
        assert!(built.to_string_lossy().ends_with(".build"));
        assert!(!built.exists());
        let checkout = executor.build_dirs.borrow().first().cloned().unwrap();
        assert!(!checkout.exists());
    }

    #[test]
    fn missing_toolchain_is_reported_with_hint() {
        let fx = Fixture::new();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor {
            which_result: false,
            ..FakeExecutor::default()
        };

        let err =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap_err();

        assert!(matches!(
            err,
            AcquireError::ToolchainMissing { ref tool, ref hint }
                if tool == "cargo" && hint.contains("rustup.rs")
        ));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn unreachable_repository_is_clone_error() {
        let fx = Fixture::new();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor::default();

        let err =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap_err();

        assert!(matches!(err, AcquireError::Clone { .. }), "{err}");
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn failing_build_is_reported() {
        let fx = Fixture::new();
        fx.init_source_repo();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor {
            build_artifact: None,
            ..FakeExecutor::default()
        };

        let err =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap_err();

        assert!(
            matches!(&err, AcquireError::BuildFailed { reason } if reason.contains("could not compile")),
            "{err}"
        );
        let checkout = executor.build_dirs.borrow().first().cloned().unwrap();
        assert!(!checkout.exists());
    }

    #[test]
    fn build_without_artifact_is_reported() {
        let fx = Fixture::new();
        fx.init_source_repo();
        let fetcher = MockFetcher::new();
        let executor = FakeExecutor {
            build_artifact: Some("target/debug/mycli".to_string()),
            ..FakeExecutor::default()
        };

        let err =
            build_from_source(&fx.ctx(&executor, &fetcher, RunOptions::default())).unwrap_err();

        assert!(
            matches!(&err, AcquireError::ArtifactMissing { path } if path.ends_with("target/release/mycli")),
            "{err}"
        );
    }
}
