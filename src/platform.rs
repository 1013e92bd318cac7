//! Host platform detection and supported-platform targets.
use std::fmt;

use serde::Deserialize;

/// Detected operating system, named the way `uname -s` reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    /// macOS (`Darwin`).
    MacOs,
    /// Linux.
    Linux,
    /// Windows.
    Windows,
    /// Anything else, carrying the raw identifier.
    Other(String),
}

impl Os {
    /// Parse a `uname -s` or [`std::env::consts::OS`] identifier.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Self::MacOs,
            "linux" => Self::Linux,
            "windows" | "windows_nt" => Self::Windows,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Lowercase form used in release asset names (`darwin`, `linux`, …).
    #[must_use]
    pub fn asset_name(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "Darwin"),
            Self::Linux => write!(f, "Linux"),
            Self::Windows => write!(f, "Windows"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Detected CPU architecture, named the way `uname -m` reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit ARM (`arm64`, a.k.a. `aarch64`).
    Arm64,
    /// 64-bit x86 (`x86_64`).
    X86_64,
    /// Anything else, carrying the raw identifier.
    Other(String),
}

impl Arch {
    /// Parse a `uname -m` or [`std::env::consts::ARCH`] identifier.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "arm64" | "aarch64" => Self::Arm64,
            "x86_64" | "amd64" => Self::X86_64,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm64 => write!(f, "arm64"),
            Self::X86_64 => write!(f, "x86_64"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Platform information for the current system.
///
/// Read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Detect the current platform from the compile-time target.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Os::parse(std::env::consts::OS),
            arch: Arch::parse(std::env::consts::ARCH),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Whether the platform is macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Whether this platform matches a configured target.
    #[must_use]
    pub fn matches(&self, target: &PlatformTarget) -> bool {
        Os::parse(&target.os) == self.os && Arch::parse(&target.arch) == self.arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// One supported OS/architecture combination, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformTarget {
    /// OS name (`Darwin`, `Linux`, …).
    pub os: String,
    /// Architecture name (`arm64`, `x86_64`, …).
    pub arch: String,
}

impl PlatformTarget {
    /// Create a target from OS and architecture names.
    #[must_use]
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Apple Silicon macOS, the only platform release binaries are published for.
    #[must_use]
    pub fn apple_silicon() -> Self {
        Self::new("Darwin", "arm64")
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
