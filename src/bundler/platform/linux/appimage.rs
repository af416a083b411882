//! AppImage bundler - portable Linux applications.

use super::{
    appdir::AppDirAssembler,
    tool::{ToolAcquirer, ToolSpec},
};
use crate::bundler::{
    error::{ErrorExt, Result},
    logging::Logger,
    process::{CommandExecutor, ExecOptions, path_arg},
    settings::BuildContext,
    utils::{checksum, fs},
};
use std::fmt;
use std::path::Path;

/// Compression passed to appimagetool.
const COMPRESSION: &str = "gzip";

/// Progress of a packaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Populating the AppDir.
    AssemblingBundle,
    /// Making sure appimagetool is cached.
    AcquiringTool,
    /// Running appimagetool.
    Invoking,
    /// Removing the AppDir.
    CleaningUp,
    /// Image produced and recorded.
    Done,
    /// Run aborted.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::AssemblingBundle => "assembling bundle",
            PipelineState::AcquiringTool => "acquiring tool",
            PipelineState::Invoking => "invoking bundler",
            PipelineState::CleaningUp => "cleaning up",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// File name of the image produced for `ctx`.
///
/// `<product>-<version with spaces as underscores>-<arch suffix>.AppImage`
pub fn artifact_name(ctx: &BuildContext) -> String {
    format!(
        "{}-{}-{}.AppImage",
        ctx.product_name(),
        ctx.version().replace(' ', "_"),
        ctx.architecture().artifact_suffix()
    )
}

/// Packages a browser build as an AppImage.
///
/// # Process
///
/// 1. Removes any AppDir left over from a previous run
/// 2. Assembles a fresh AppDir (binaries, libraries, desktop entry, AppRun)
/// 3. Ensures appimagetool is cached under `<root>/build/tools`
/// 4. Invokes appimagetool to compress the AppDir into a single file
/// 5. Removes the AppDir, on success and failure alike
#[derive(Debug)]
pub struct PackagingPipeline<'a> {
    logger: &'a Logger,
    tool: ToolSpec,
    state: PipelineState,
}

impl<'a> PackagingPipeline<'a> {
    /// Pipeline using the appimagetool release for this host.
    pub fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            tool: ToolSpec::appimagetool(),
            state: PipelineState::Idle,
        }
    }

    /// Uses a different bundler tool.
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = tool;
        self
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs one packaging pass for `ctx`.
    ///
    /// Returns `Ok(true)` and records the image path on `ctx` when an image
    /// was produced, `Ok(false)` when assembly or tool acquisition failed,
    /// and `Err` when the bundler command failed.
    pub async fn package(&mut self, ctx: &mut BuildContext) -> Result<bool> {
        self.logger.info(&format!(
            "📦 Packaging {} {} for Linux ({})",
            ctx.product_name(),
            ctx.version(),
            ctx.architecture()
        ));
        let versions = ctx.versions();
        if !versions.chromium.is_empty() {
            self.logger.info(&format!(
                "   Chromium {} (browser {})",
                versions.chromium, versions.combined
            ));
        }

        let package_dir = ctx.package_dir();
        tokio::fs::create_dir_all(&package_dir)
            .await
            .fs_context("creating package directory", &package_dir)?;

        let appdir = package_dir.join(format!("{}.AppDir", ctx.product_name()));
        if appdir.exists() {
            log::debug!("Removing stale AppDir {}", appdir.display());
            fs::remove_dir_all(&appdir).await?;
        }

        let output_path = package_dir.join(artifact_name(ctx));
        let outcome = self.build_image(ctx, &appdir, &output_path).await;

        self.transition(PipelineState::CleaningUp);
        if let Err(e) = fs::remove_dir_all(&appdir).await {
            self.logger.warn(&format!("Failed to remove AppDir: {e}"));
        }

        match outcome {
            Ok(true) => {
                if let Err(e) = ctx.set_package_path(output_path.clone()) {
                    self.transition(PipelineState::Failed);
                    return Err(e);
                }
                self.report(&output_path).await;
                self.transition(PipelineState::Done);
                Ok(true)
            }
            Ok(false) => {
                self.transition(PipelineState::Failed);
                Ok(false)
            }
            Err(e) => {
                self.logger.error("Failed to create AppImage");
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn build_image(
        &mut self,
        ctx: &BuildContext,
        appdir: &Path,
        output_path: &Path,
    ) -> Result<bool> {
        self.transition(PipelineState::AssemblingBundle);
        let assembler = AppDirAssembler::for_context(self.logger, ctx);
        if !assembler
            .assemble(ctx.out_dir(), &ctx.resources_dir(), appdir)
            .await
        {
            return Ok(false);
        }

        self.transition(PipelineState::AcquiringTool);
        self.logger.info("📦 Creating AppImage...");
        let Some(appimagetool) = ToolAcquirer::new(self.logger)
            .ensure(&ctx.tools_dir(), &self.tool)
            .await
        else {
            self.logger.error("appimagetool is unavailable, cannot create AppImage");
            return Ok(false);
        };

        self.transition(PipelineState::Invoking);
        let argv = [
            path_arg(&appimagetool),
            "--comp".to_string(),
            COMPRESSION.to_string(),
            path_arg(appdir),
            path_arg(output_path),
        ];
        // No FUSE in containers; the tool unpacks itself instead of mounting.
        let options = ExecOptions::default()
            .env("ARCH", ctx.architecture().appimage_arch())
            .env("APPIMAGE_EXTRACT_AND_RUN", "1");
        CommandExecutor::new(self.logger)
            .execute(&argv, &options)
            .await?;

        if !output_path.is_file() {
            self.logger.error(&format!(
                "appimagetool finished but {} was not created",
                output_path.display()
            ));
            return Ok(false);
        }

        fs::set_mode(output_path, 0o755).await?;
        Ok(true)
    }

    async fn report(&self, output_path: &Path) {
        self.logger
            .success(&format!("AppImage created: {}", output_path.display()));

        match tokio::fs::metadata(output_path).await {
            Ok(meta) => self.logger.info(&format!(
                "   Size: {:.1} MB",
                meta.len() as f64 / 1024.0 / 1024.0
            )),
            Err(e) => log::debug!("Could not stat {}: {}", output_path.display(), e),
        }

        match checksum::calculate_sha256(output_path).await {
            Ok(digest) => self.logger.info(&format!("   SHA256: {digest}")),
            Err(e) => self.logger.warn(&format!("Could not checksum AppImage: {e}")),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("Packaging: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Universal (multi-architecture) images do not exist on Linux.
pub fn package_universal(logger: &Logger, contexts: &[BuildContext]) -> bool {
    log::debug!("Universal packaging requested for {} contexts", contexts.len());
    logger.warn("Universal binaries are not supported on Linux");
    false
}

/// AppImages are not code-signed; nothing to do.
pub fn sign_binaries(logger: &Logger, ctx: &BuildContext) -> bool {
    log::debug!("Signing requested for {}", ctx.product_name());
    logger.info("Code signing is not required for Linux AppImages");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::Arch;

    #[test]
    fn test_artifact_name_replaces_spaces() {
        let ctx = BuildContext::builder("/repo")
            .product_name("BrowserOS")
            .version("0.9 beta")
            .architecture(Arch::Arm64)
            .build()
            .unwrap();
        assert_eq!(artifact_name(&ctx), "BrowserOS-0.9_beta-arm64.AppImage");
    }

    #[test]
    fn test_artifact_name_uses_product_version_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("CHROMIUM_VERSION"),
            "MAJOR=137\nMINOR=0\nBUILD=7151\nPATCH=69\n",
        )
        .unwrap();
        let config = dir.path().join("build/config");
        std::fs::create_dir_all(&config).unwrap();
        std::fs::write(config.join("NXTSCAPE_VERSION"), "42\n").unwrap();

        let ctx = BuildContext::builder(dir.path())
            .product_name("BrowserOS")
            .build()
            .unwrap();
        assert_eq!(ctx.version(), "42");
        assert_eq!(artifact_name(&ctx), "BrowserOS-42-x86_64.AppImage");
    }

    #[test]
    fn test_not_applicable_operations() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::open(dir.path()).with_console(false);
        let ctx = BuildContext::builder("/repo")
            .product_name("BrowserOS")
            .version("1")
            .build()
            .unwrap();

        assert!(!package_universal(&logger, std::slice::from_ref(&ctx)));
        assert!(sign_binaries(&logger, &ctx));
    }
}
