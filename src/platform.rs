//! Platform resolution for core binary selection.
//!
//! The version-check endpoint hands out a different core build per operating
//! system and CPU architecture, so the agent has to describe the host in the
//! small vocabulary the endpoint understands. Unknown platforms map to a
//! `not-supported` sentinel instead of an error; the endpoint is the one that
//! decides what to do with those.

use std::fmt;
use std::path::{Path, PathBuf};

/// Operating systems the core is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    Unsupported,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::Unsupported => "not-supported",
        };
        write!(f, "{s}")
    }
}

/// CPU architectures the core is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
    Unsupported,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Arch::X86 => "386",
            Arch::X64 => "amd64",
            Arch::Unsupported => "not-supported",
        };
        write!(f, "{s}")
    }
}

/// The host platform as seen by the version-check endpoint.
///
/// Resolved once at startup and immutable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    /// Resolve the platform the agent is running on.
    ///
    /// Total over every host: values outside the supported set come back as
    /// `Unsupported` rather than failing.
    pub fn resolve() -> Self {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn from_raw(os: &str, arch: &str) -> Self {
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Darwin,
            "windows" => Os::Windows,
            _ => Os::Unsupported,
        };
        let arch = match arch {
            "x86" => Arch::X86,
            "x86_64" => Arch::X64,
            _ => Arch::Unsupported,
        };
        Self { os, arch }
    }

    /// Whether the host is a Windows machine.
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// File name of the core executable on this platform.
    pub fn core_file_name(&self) -> &'static str {
        if self.is_windows() {
            "core.exe"
        } else {
            "core"
        }
    }

    /// Full path of the core executable inside `home_dir`.
    pub fn core_path(&self, home_dir: &Path) -> PathBuf {
        home_dir.join(self.core_file_name())
    }
}
