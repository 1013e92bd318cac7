//! Network seam: fetch a URL into a local file.
use std::fs::File;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;

use thiserror::Error;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("mycli-install/", env!("CARGO_PKG_VERSION"));

/// Failure while fetching a URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request failed (DNS, TLS, connection, or non-2xx status).
    #[error(transparent)]
    Http(#[from] ureq::Error),

    /// The response body could not be written to disk.
    #[error("writing download: {0}")]
    Io(#[from] io::Error),
}

/// Downloads a URL to a file.
///
/// A single attempt is made; callers own any fallback policy.
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher {
    /// Fetch `url` and write the body to `dest`, truncating it first.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be written.
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Blocking HTTP fetcher backed by `ureq`.
///
/// No timeouts are configured beyond the client defaults and no retries are
/// attempted.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = ureq::get(url).header("User-Agent", USER_AGENT).call()?;
        let mut reader = response.into_body().into_reader();
        let mut writer = BufWriter::new(File::create(dest)?);
        let written = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        Ok(written)
    }
}

/// Reads `file://` URLs and plain paths from the local filesystem.
///
/// Useful for offline mirrors and for testing release artifacts before they
/// are published.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFetcher;

impl Fetcher for LocalFetcher {
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let source = url.strip_prefix("file://").unwrap_or(url);
        Ok(std::fs::copy(source, dest)?)
    }
}

/// Pick the fetcher for a URL scheme.
#[must_use]
pub fn for_url(url: &str) -> Box<dyn Fetcher> {
    if url.starts_with("file://") {
        Box::new(LocalFetcher)
    } else {
        Box::new(HttpFetcher)
    }
}
