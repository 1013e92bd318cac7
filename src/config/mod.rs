//! Installer configuration.
//!
//! Every ambient decision the installer makes (which platforms are
//! supported, where the binary comes from, where it may be installed) is a
//! field here. The defaults reproduce the stock behaviour; a TOML file passed
//! with `--config` overrides individual fields.
pub mod toml_loader;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::platform::{Platform, PlatformTarget};

/// What to do when the pre-built binary cannot be downloaded or verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Clone the source repository and build the binary locally.
    #[default]
    BuildFromSource,
    /// Fail the run.
    Abort,
}

/// How to build the binary from a source checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Toolchain program (must be on PATH).
    pub program: String,
    /// Arguments for a release build.
    pub args: Vec<String>,
    /// Artifact path relative to the checkout; `{name}` is the binary name.
    pub artifact: String,
    /// Remediation hint printed when `program` is missing.
    pub hint: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["build".to_string(), "--release".to_string()],
            artifact: "target/release/{name}".to_string(),
            hint: "install Rust from https://rustup.rs".to_string(),
        }
    }
}

/// Complete installer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// File name of the installed binary.
    pub binary_name: String,
    /// Release version to download.
    pub version: String,
    /// Release asset URL template.
    ///
    /// Placeholders: `{version}`, `{name}`, `{os}`, `{arch}`.
    pub download_url: String,
    /// Git URL of the source repository used by the build fallback.
    pub source_repo: String,
    /// Branch to check out; the remote's default branch when unset.
    pub source_ref: Option<String>,
    /// Behaviour when download or verification fails.
    pub fallback: FallbackPolicy,
    /// Arguments used to verify that a binary runs.
    pub verify_args: Vec<String>,
    /// Install directories in preference order; the last one is created if
    /// no earlier entry is writable. A leading `~` expands to `HOME`.
    pub install_dirs: Vec<String>,
    /// Supported OS/architecture combinations.
    pub supported: Vec<PlatformTarget>,
    /// Source build settings.
    pub build: BuildConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            binary_name: "mycli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            download_url:
                "https://github.com/mycli-dev/mycli/releases/download/v{version}/{name}-{os}-{arch}"
                    .to_string(),
            source_repo: "https://github.com/mycli-dev/mycli.git".to_string(),
            source_ref: None,
            fallback: FallbackPolicy::default(),
            verify_args: vec!["--version".to_string()],
            install_dirs: vec![
                "/usr/local/bin".to_string(),
                "/opt/homebrew/bin".to_string(),
                "~/.local/bin".to_string(),
            ],
            supported: vec![PlatformTarget::apple_silicon()],
            build: BuildConfig::default(),
        }
    }
}

impl InstallerConfig {
    /// Load configuration from `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), toml_loader::load_config::<Self>)
    }

    /// Render the download URL for `platform`.
    #[must_use]
    pub fn render_download_url(&self, platform: &Platform) -> String {
        self.download_url
            .replace("{version}", &self.version)
            .replace("{name}", &self.binary_name)
            .replace("{os}", &platform.os.asset_name())
            .replace("{arch}", &platform.arch.to_string())
    }

    /// Artifact path relative to a source checkout.
    #[must_use]
    pub fn build_artifact(&self) -> String {
        self.build.artifact.replace("{name}", &self.binary_name)
    }
}
