//! Build parameters shared by every packaging step.

use super::{Arch, VersionInfo};
use crate::bundler::error::{Context, Error, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Immutable build parameters plus the packaged artifact location.
///
/// Owned by the top-level driver and lent to each component. The only
/// mutable field, the package path, is written once by the packaging
/// pipeline after it produced an image.
#[derive(Debug)]
pub struct BuildContext {
    root_dir: PathBuf,
    out_dir: PathBuf,
    architecture: Arch,
    product_name: String,
    version: String,
    versions: VersionInfo,
    started_at: Instant,
    package_path: Option<PathBuf>,
}

impl BuildContext {
    /// Starts a builder for a repository rooted at `root_dir`.
    pub fn builder(root_dir: impl Into<PathBuf>) -> BuildContextBuilder {
        BuildContextBuilder::new(root_dir)
    }

    /// Repository root.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory holding the compiled browser artifacts.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Target architecture.
    pub fn architecture(&self) -> Arch {
        self.architecture
    }

    /// Human-readable product name, e.g. `BrowserOS`.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Lowercase identifier used for install paths, desktop and icon files.
    pub fn app_id(&self) -> String {
        self.product_name
            .trim()
            .to_lowercase()
            .replace(char::is_whitespace, "-")
    }

    /// Version string used in artifact names.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Versions read from the repository's version files.
    pub fn versions(&self) -> &VersionInfo {
        &self.versions
    }

    /// When this context was created.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Directory of static resources (icons, ...).
    pub fn resources_dir(&self) -> PathBuf {
        self.root_dir.join("resources")
    }

    /// Cache directory for downloaded tools.
    pub fn tools_dir(&self) -> PathBuf {
        self.root_dir.join("build").join("tools")
    }

    /// Output directory for packages of this architecture.
    pub fn package_dir(&self) -> PathBuf {
        self.root_dir
            .join("out")
            .join("package")
            .join(self.architecture.as_str())
    }

    /// Path of the produced package, once packaging succeeded.
    pub fn package_path(&self) -> Option<&Path> {
        self.package_path.as_deref()
    }

    /// Records the produced package. Fails if a path was already recorded.
    pub(crate) fn set_package_path(&mut self, path: PathBuf) -> Result<()> {
        if let Some(existing) = &self.package_path {
            return Err(Error::PackagePathAlreadySet(existing.clone()));
        }
        self.package_path = Some(path);
        Ok(())
    }
}

/// Builder for [`BuildContext`].
///
/// # Examples
///
/// ```no_run
/// use browser_bundler::bundler::{Arch, BuildContext};
///
/// # fn example() -> browser_bundler::bundler::Result<()> {
/// let ctx = BuildContext::builder("/src/browser")
///     .out_dir("/src/browser/chromium_src/out/Default")
///     .architecture(Arch::X64)
///     .product_name("BrowserOS")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BuildContextBuilder {
    root_dir: PathBuf,
    out_dir: Option<PathBuf>,
    architecture: Arch,
    product_name: Option<String>,
    version: Option<String>,
}

impl BuildContextBuilder {
    fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            out_dir: None,
            architecture: Arch::default(),
            product_name: None,
            version: None,
        }
    }

    /// Sets the compiled-artifact directory.
    ///
    /// Default: `<root>/out/Default`
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Sets the target architecture.
    ///
    /// Default: [`Arch::X64`]
    pub fn architecture(mut self, arch: Arch) -> Self {
        self.architecture = arch;
        self
    }

    /// Sets the product name.
    ///
    /// # Required
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Overrides the version otherwise read from the repository.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builds the context, reading version files when no version was given.
    ///
    /// # Errors
    ///
    /// Fails when the product name is missing or no version can be resolved.
    pub fn build(self) -> Result<BuildContext> {
        let product_name = self
            .product_name
            .filter(|name| !name.trim().is_empty())
            .context("product name is required")?;

        let versions = VersionInfo::load(&self.root_dir);
        let version = self
            .version
            .or_else(|| Some(versions.display_version().to_string()))
            .filter(|v| !v.trim().is_empty())
            .with_context(|| {
                format!(
                    "no version given and none found under {}",
                    self.root_dir.display()
                )
            })?;

        let out_dir = self
            .out_dir
            .unwrap_or_else(|| self.root_dir.join("out").join("Default"));

        Ok(BuildContext {
            root_dir: self.root_dir,
            out_dir,
            architecture: self.architecture,
            product_name,
            version,
            versions,
            started_at: Instant::now(),
            package_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BuildContext {
        BuildContext::builder("/repo")
            .architecture(Arch::Arm64)
            .product_name("Browser OS")
            .version("1.2 beta")
            .build()
            .unwrap()
    }

    #[test]
    fn test_derived_paths() {
        let ctx = context();
        assert_eq!(ctx.out_dir(), Path::new("/repo/out/Default"));
        assert_eq!(ctx.package_dir(), Path::new("/repo/out/package/arm64"));
        assert_eq!(ctx.tools_dir(), Path::new("/repo/build/tools"));
        assert_eq!(ctx.app_id(), "browser-os");
    }

    #[test]
    fn test_package_path_set_once() {
        let mut ctx = context();
        assert!(ctx.package_path().is_none());

        ctx.set_package_path(PathBuf::from("/repo/a.AppImage")).unwrap();
        let err = ctx.set_package_path(PathBuf::from("/repo/b.AppImage"));
        assert!(matches!(err, Err(Error::PackagePathAlreadySet(_))));
        assert_eq!(ctx.package_path(), Some(Path::new("/repo/a.AppImage")));
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BuildContext::builder(dir.path())
            .product_name("BrowserOS")
            .build();
        assert!(result.is_err());
    }
}
