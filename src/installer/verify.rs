//! Run-and-check verification of a binary artifact.
use std::path::Path;

use crate::error::AcquireError;
use crate::exec::Executor;
use crate::resources::Resource as _;
use crate::resources::executable::ExecutableResource;

/// Mark `path` executable and run it with `args` (normally `--version`).
///
/// Returns the trimmed standard output on success. A spawn failure, crash,
/// or non-zero exit is reported as [`AcquireError::VerifyFailed`].
///
/// # Errors
///
/// Returns [`AcquireError::VerifyFailed`] if the file cannot be made
/// executable or does not run successfully.
pub fn verify_binary(
    executor: &dyn Executor,
    path: &Path,
    args: &[String],
) -> Result<String, AcquireError> {
    let failed = |reason: String| AcquireError::VerifyFailed {
        path: path.to_path_buf(),
        reason,
    };

    ExecutableResource::new(path)
        .ensure()
        .map_err(|e| failed(format!("{e:#}")))?;

    let program = path
        .to_str()
        .ok_or_else(|| failed("path is not valid UTF-8".to_string()))?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = executor
        .run_unchecked(program, &args)
        .map_err(|e| failed(format!("{e:#}")))?;
    if !result.success {
        return Err(failed(result.status_text()));
    }
    Ok(result.stdout.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::SystemExecutor;

    fn version_args() -> Vec<String> {
        vec!["--version".to_string()]
    }

    #[cfg(unix)]
    #[test]
    fn working_script_passes_and_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("mycli");
        std::fs::write(&bin, "#!/bin/sh\necho \"mycli 0.1.0\"\n").unwrap();

        let version = verify_binary(&SystemExecutor, &bin, &version_args()).unwrap();
        assert_eq!(version, "mycli 0.1.0");
    }

    #[cfg(unix)]
    #[test]
    fn marks_artifact_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("mycli");
        std::fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o600)).unwrap();

        verify_binary(&SystemExecutor, &bin, &version_args()).unwrap();
        let mode = std::fs::metadata(&bin).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("mycli");
        std::fs::write(&bin, "#!/bin/sh\necho broken >&2\nexit 3\n").unwrap();

        let err = verify_binary(&SystemExecutor, &bin, &version_args()).unwrap_err();
        assert!(
            matches!(&err, AcquireError::VerifyFailed { reason, .. } if reason == "exit 3: broken"),
            "unexpected error: {err}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_content_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("mycli");
        std::fs::write(&bin, b"\x7fELF\x02\x01garbage").unwrap();

        let err = verify_binary(&SystemExecutor, &bin, &version_args()).unwrap_err();
        assert!(matches!(err, AcquireError::VerifyFailed { .. }));
    }

    #[test]
    fn missing_file_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            verify_binary(&SystemExecutor, &dir.path().join("absent"), &version_args()).unwrap_err();
        assert!(
            matches!(&err, AcquireError::VerifyFailed { reason, .. } if reason.contains("not a file")),
            "{err}"
        );
    }
}
