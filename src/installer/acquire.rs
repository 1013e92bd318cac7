//! Binary acquisition: download and verify, falling back to a source build.
use std::fmt;

use tempfile::TempPath;

use super::{Context, source_build, verify};
use crate::config::FallbackPolicy;
use crate::error::AcquireError;
use crate::fetch::Fetcher;

/// Where an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Pre-built release binary.
    Download,
    /// Built locally from the source repository.
    SourceBuild,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::SourceBuild => write!(f, "source build"),
        }
    }
}

/// A verified binary waiting in a temporary file.
///
/// The file is deleted when the artifact is dropped unless placement has
/// already moved it.
#[derive(Debug)]
pub struct Artifact {
    /// Temporary file holding the binary.
    pub path: TempPath,
    /// How the binary was obtained.
    pub origin: Origin,
    /// Output of the verification run (e.g. `mycli 0.1.0`).
    pub version: String,
}

/// Fetch `url` into a new temporary file named after `name`.
///
/// # Errors
///
/// Returns [`AcquireError::TempFile`] if the temporary file cannot be
/// created, or [`AcquireError::Download`] if the fetch fails. The partial
/// file is removed in both cases.
pub fn download(fetcher: &dyn Fetcher, url: &str, name: &str) -> Result<TempPath, AcquireError> {
    let path = tempfile::Builder::new()
        .prefix(&format!("{name}-"))
        .suffix(".download")
        .tempfile()
        .map_err(AcquireError::TempFile)?
        // Closed before it is executed; Linux refuses to exec an open file.
        .into_temp_path();

    fetcher
        .fetch_to(url, &path)
        .map_err(|source| AcquireError::Download {
            url: url.to_string(),
            source,
        })?;
    Ok(path)
}

fn download_and_verify(ctx: &Context<'_>, url: &str) -> Result<Artifact, AcquireError> {
    ctx.log.info(&format!("downloading {url}"));
    let path = download(ctx.fetcher, url, &ctx.config.binary_name)?;
    ctx.log.debug(&format!("saved to {}", path.display()));

    let version = verify::verify_binary(ctx.executor, &path, &ctx.config.verify_args)?;
    ctx.log.info(&format!("verified: {version}"));
    Ok(Artifact {
        path,
        origin: Origin::Download,
        version,
    })
}

/// Obtain a verified binary.
///
/// Download or verification failures are recovered by a source build when
/// the fallback policy allows it; every other failure is returned as is.
///
/// # Errors
///
/// Returns the download or verification error under
/// [`FallbackPolicy::Abort`], or the source build's error otherwise.
pub fn acquire(ctx: &Context<'_>) -> Result<Artifact, AcquireError> {
    let url = ctx.config.render_download_url(ctx.platform);
    match download_and_verify(ctx, &url) {
        Ok(artifact) => Ok(artifact),
        Err(err @ (AcquireError::Download { .. } | AcquireError::VerifyFailed { .. }))
            if ctx.config.fallback == FallbackPolicy::BuildFromSource =>
        {
            ctx.log.warn(&format!("{err}"));
            ctx.log.info("falling back to a source build");
            source_build::build_from_source(ctx)
        }
        Err(err) => Err(err),
    }
}
