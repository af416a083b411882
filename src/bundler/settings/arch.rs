//! CPU architecture types and utilities.

use std::fmt;
use std::str::FromStr;

/// Target architecture of the compiled browser.
///
/// Accepts the build system's names (`x64`, `arm64`). Each architecture maps
/// to the name the AppImage tooling expects in `ARCH` and to the suffix used
/// in artifact file names.
///
/// # Examples
///
/// ```
/// use browser_bundler::bundler::Arch;
///
/// let arch: Arch = "x64".parse().unwrap();
/// assert_eq!(arch.appimage_arch(), "x86_64");
/// assert_eq!(arch.artifact_suffix(), "x86_64");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Arch {
    /// x86_64 / AMD64
    #[default]
    X64,
    /// AArch64 / ARM64
    Arm64,
}

impl Arch {
    /// Build-system name (`x64`, `arm64`).
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Canonical CPU architecture passed to appimagetool via `ARCH`.
    pub fn appimage_arch(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "aarch64",
        }
    }

    /// Suffix used in produced artifact names.
    pub fn artifact_suffix(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(crate::bundler::Error::ArchError(other.to_string())),
        }
    }
}
