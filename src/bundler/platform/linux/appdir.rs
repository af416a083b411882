//! AppDir assembly - the on-disk layout consumed by appimagetool.
//!
//! ```text
//! <AppDir>/
//! ├── AppRun                                   launcher script
//! ├── <app>.desktop                            Exec=AppRun entry
//! ├── <app>.png                                icon (when available)
//! ├── opt/<app>/                               binaries, libraries, data
//! │   ├── chrome, chrome_crashpad_handler, chrome_sandbox, ...
//! │   └── locales/, MEIPreload/
//! └── usr/share/
//!     ├── applications/<app>.desktop
//!     └── icons/hicolor/256x256/apps/<app>.png
//! ```
//!
//! Missing artifacts are logged and skipped. Only failures to create the
//! layout itself (directories, generated files, copying a file that exists)
//! make [`AppDirAssembler::assemble`] return `false`.

use crate::bundler::{
    error::{ErrorExt, Result},
    logging::Logger,
    settings::{
        BuildContext, EntryKind, FileManifestEntry,
        manifest::{self, MAIN_BINARY},
    },
    utils::fs,
};
use std::path::{Path, PathBuf};

/// MIME types and URL schemes the browser registers for.
const MIME_TYPES: &[&str] = &[
    "text/html",
    "text/xml",
    "application/xhtml+xml",
    "application/xml",
    "application/vnd.mozilla.xul+xml",
    "application/rss+xml",
    "application/rdf+xml",
    "image/gif",
    "image/jpeg",
    "image/png",
    "x-scheme-handler/http",
    "x-scheme-handler/https",
    "x-scheme-handler/ftp",
    "x-scheme-handler/chrome",
    "video/webm",
    "application/x-xpinstall",
];

/// Icon shipped in the repository's resources directory.
const ICON_SOURCE: &str = "icons/product_logo.png";

/// Paths inside an AppDir.
#[derive(Debug, Clone)]
pub struct AppDirLayout {
    root: PathBuf,
    app_id: String,
}

impl AppDirLayout {
    /// Layout rooted at `root` for application `app_id`.
    pub fn new(root: impl Into<PathBuf>, app_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            app_id: app_id.into(),
        }
    }

    /// AppDir root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the browser files (`opt/<app>`).
    pub fn binary_root(&self) -> PathBuf {
        self.root.join("opt").join(&self.app_id)
    }

    /// `usr/share`.
    pub fn share_root(&self) -> PathBuf {
        self.root.join("usr").join("share")
    }

    /// `usr/share/applications`.
    pub fn applications_dir(&self) -> PathBuf {
        self.share_root().join("applications")
    }

    /// `usr/share/icons/hicolor/256x256/apps`.
    pub fn icon_dir(&self) -> PathBuf {
        self.share_root()
            .join("icons")
            .join("hicolor")
            .join("256x256")
            .join("apps")
    }

    /// Installed desktop entry.
    pub fn desktop_file(&self) -> PathBuf {
        self.applications_dir().join(format!("{}.desktop", self.app_id))
    }

    /// Installed icon.
    pub fn icon_file(&self) -> PathBuf {
        self.icon_dir().join(format!("{}.png", self.app_id))
    }

    /// Launcher script.
    pub fn launcher(&self) -> PathBuf {
        self.root.join("AppRun")
    }

    /// Install path of the main binary as seen from inside the image.
    fn installed_main_binary(&self) -> String {
        format!("/opt/{}/{}", self.app_id, MAIN_BINARY)
    }

    fn skeleton(&self) -> [PathBuf; 3] {
        [self.binary_root(), self.applications_dir(), self.icon_dir()]
    }
}

/// Builds an AppDir from a browser build output directory.
#[derive(Debug)]
pub struct AppDirAssembler<'a> {
    logger: &'a Logger,
    product_name: String,
    app_id: String,
}

impl<'a> AppDirAssembler<'a> {
    /// Creates an assembler for `product_name`, installed as `app_id`.
    pub fn new(logger: &'a Logger, product_name: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            logger,
            product_name: product_name.into(),
            app_id: app_id.into(),
        }
    }

    /// Creates an assembler for the product described by `ctx`.
    pub fn for_context(logger: &'a Logger, ctx: &BuildContext) -> Self {
        Self::new(logger, ctx.product_name(), ctx.app_id())
    }

    /// Populates `bundle_dir` from `build_output_dir` and `resources_dir`.
    ///
    /// Returns `false` when the layout could not be written; missing
    /// artifacts never cause a `false` return.
    pub async fn assemble(
        &self,
        build_output_dir: &Path,
        resources_dir: &Path,
        bundle_dir: &Path,
    ) -> bool {
        let layout = AppDirLayout::new(bundle_dir, self.app_id.clone());

        match self.populate(&layout, build_output_dir, resources_dir).await {
            Ok(()) => true,
            Err(e) => {
                self.logger.error(&format!("Failed to prepare AppDir: {e}"));
                false
            }
        }
    }

    async fn populate(
        &self,
        layout: &AppDirLayout,
        build_output_dir: &Path,
        resources_dir: &Path,
    ) -> Result<()> {
        self.logger.info("📁 Preparing AppDir structure...");

        for dir in layout.skeleton() {
            tokio::fs::create_dir_all(&dir)
                .await
                .fs_context("creating AppDir structure", &dir)?;
        }

        let binary_root = layout.binary_root();
        for entry in manifest::BROWSER_FILES
            .iter()
            .chain(manifest::BROWSER_DIRECTORIES)
        {
            self.copy_entry(entry, build_output_dir, &binary_root).await?;
        }

        self.apply_permissions(&binary_root).await?;

        let desktop = desktop_entry(&self.product_name, &self.app_id, &layout.installed_main_binary());
        fs::write_with_mode(&layout.desktop_file(), &desktop, 0o644).await?;
        let root_desktop = desktop_entry(&self.product_name, &self.app_id, "AppRun");
        let root_desktop_path = layout.root().join(format!("{}.desktop", self.app_id));
        fs::write_with_mode(&root_desktop_path, &root_desktop, 0o644).await?;
        self.logger.info("  ✓ Created desktop file");

        self.copy_icon(layout, resources_dir).await;

        fs::write_with_mode(&layout.launcher(), &launcher_script(&self.app_id), 0o755).await?;
        self.logger.info("  ✓ Created AppRun script");

        Ok(())
    }

    async fn copy_entry(
        &self,
        entry: &FileManifestEntry,
        build_output_dir: &Path,
        binary_root: &Path,
    ) -> Result<()> {
        let src = build_output_dir.join(entry.name);
        let dst = binary_root.join(entry.name);

        match entry.kind {
            EntryKind::File if src.is_file() => {
                fs::copy_file(&src, &dst).await?;
                self.logger.info(&format!("  ✓ Copied {}", entry.name));
            }
            EntryKind::Directory if src.is_dir() => {
                fs::copy_dir(&src, &dst).await?;
                self.logger.info(&format!("  ✓ Copied {}/", entry.name));
            }
            _ if entry.required => {
                self.logger.warn(&format!("  File not found: {}", entry.name));
            }
            _ => {
                log::debug!("Optional entry {} not present, skipping", entry.name);
            }
        }
        Ok(())
    }

    async fn apply_permissions(&self, binary_root: &Path) -> Result<()> {
        for (name, mode) in manifest::PERMISSIONS {
            let path = binary_root.join(name);
            if path.is_file() {
                fs::set_mode(&path, *mode).await?;
            } else if *name == MAIN_BINARY {
                // Kept advisory; appimagetool still runs over the partial tree.
                self.logger.warn(&format!(
                    "  Main executable {} is missing; the image will not start",
                    MAIN_BINARY
                ));
            }
        }
        Ok(())
    }

    /// Copies the product icon. Every failure here is advisory.
    async fn copy_icon(&self, layout: &AppDirLayout, resources_dir: &Path) {
        let icon_src = resources_dir.join(ICON_SOURCE);
        if !icon_src.is_file() {
            self.logger.warn(&format!(
                "  Icon not found at {}",
                icon_src.display()
            ));
            return;
        }

        let root_icon = layout.root().join(format!("{}.png", self.app_id));
        for dst in [layout.icon_file(), root_icon] {
            if let Err(e) = fs::copy_file(&icon_src, &dst).await {
                self.logger.warn(&format!("  Failed to copy icon: {e}"));
                return;
            }
        }
        self.logger.info("  ✓ Copied icon");
    }
}

/// Renders the freedesktop.org entry for the browser.
pub fn desktop_entry(product_name: &str, app_id: &str, exec: &str) -> String {
    let mut mime_types = MIME_TYPES.join(";");
    mime_types.push(';');

    format!(
        "[Desktop Entry]\n\
         Version=1.0\n\
         Name={product_name}\n\
         GenericName=Web Browser\n\
         Comment=Browse the World Wide Web\n\
         Exec={exec} %U\n\
         Terminal=false\n\
         Type=Application\n\
         Categories=Network;WebBrowser;\n\
         MimeType={mime_types}\n\
         Icon={app_id}\n"
    )
}

/// Renders the AppRun launcher.
///
/// The script resolves its own location through symlinks, puts the binary
/// root first on `PATH` and `LD_LIBRARY_PATH`, and replaces itself with the
/// browser process.
pub fn launcher_script(app_id: &str) -> String {
    format!(
        r#"#!/bin/sh
HERE="$(dirname "$(readlink -f "${{0}}")")"

export PATH="${{HERE}}/opt/{app_id}:${{PATH}}"
export LD_LIBRARY_PATH="${{HERE}}/opt/{app_id}:${{LD_LIBRARY_PATH}}"
export CHROME_DESKTOP="{app_id}.desktop"

exec "${{HERE}}/opt/{app_id}/{MAIN_BINARY}" "$@"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_entry_fields() {
        let entry = desktop_entry("BrowserOS", "browseros", "/opt/browseros/chrome");
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("\nName=BrowserOS\n"));
        assert!(entry.contains("\nExec=/opt/browseros/chrome %U\n"));
        assert!(entry.contains("\nIcon=browseros\n"));

        let mime_line = entry
            .lines()
            .find(|l| l.starts_with("MimeType="))
            .unwrap();
        assert!(mime_line.ends_with("application/x-xpinstall;"));
        assert_eq!(mime_line.matches(';').count(), MIME_TYPES.len());
    }

    #[test]
    fn test_launcher_script_execs_main_binary() {
        let script = launcher_script("browseros");
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(r#"HERE="$(dirname "$(readlink -f "${0}")")""#));
        assert!(script.contains(r#"export LD_LIBRARY_PATH="${HERE}/opt/browseros:${LD_LIBRARY_PATH}""#));
        assert!(script.contains(r#"export CHROME_DESKTOP="browseros.desktop""#));
        assert!(script.contains(r#"exec "${HERE}/opt/browseros/chrome" "$@""#));
    }

    #[test]
    fn test_layout_paths() {
        let layout = AppDirLayout::new("/pkg/BrowserOS.AppDir", "browseros");
        assert_eq!(
            layout.binary_root(),
            Path::new("/pkg/BrowserOS.AppDir/opt/browseros")
        );
        assert_eq!(
            layout.icon_file(),
            Path::new("/pkg/BrowserOS.AppDir/usr/share/icons/hicolor/256x256/apps/browseros.png")
        );
        assert_eq!(
            layout.desktop_file(),
            Path::new("/pkg/BrowserOS.AppDir/usr/share/applications/browseros.desktop")
        );
    }
}
