//! Command line argument parsing and validation.
//!
//! This module provides comprehensive CLI argument parsing using clap,
//! with proper validation and error handling.

use crate::bundler::{self, Arch, BuildContext, notify::WEBHOOK_ENV_VAR};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// AppImage packager for Chromium-based browser builds
#[derive(Parser, Debug)]
#[command(
    name = "browser_bundler",
    version,
    about = "AppImage packager for Chromium-based browser builds",
    long_about = "Packages the compiled output of a Chromium-based browser build as a portable AppImage.

Usage:
  browser_bundler package --root ~/browser --arch x64
  browser_bundler package --root ~/browser --arch arm64 --version 0.9.0 --notify
  browser_bundler sign --root ~/browser

Exit code 0 = image written to <root>/out/package/<arch>/."
)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Package a browser build as an AppImage
    Package(PackageArgs),

    /// Code-sign the build (not required for AppImages)
    Sign(BuildArgs),

    /// Build a multi-architecture image (unsupported on Linux)
    Universal(BuildArgs),
}

/// Options describing one browser build
#[derive(ClapArgs, Debug, Clone)]
pub struct BuildArgs {
    /// Repository root of the browser sources
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory with compiled artifacts [default: <root>/out/Default]
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Target architecture: x64 or arm64
    #[arg(long, value_name = "ARCH", default_value = "x64")]
    pub arch: Arch,

    /// Product name used for the AppDir, desktop entry and image name
    #[arg(long, value_name = "NAME", default_value = "BrowserOS")]
    pub product_name: String,

    /// Version embedded in the image name [default: read from the repository]
    #[arg(long = "version", value_name = "VERSION")]
    pub build_version: Option<String>,

    /// Directory for the session log [default: <root>/logs]
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Options of the `package` command
#[derive(ClapArgs, Debug, Clone)]
pub struct PackageArgs {
    /// Build description
    #[command(flatten)]
    pub build: BuildArgs,

    /// Send build lifecycle notifications to the webhook
    #[arg(long)]
    pub notify: bool,

    /// Webhook receiving notifications
    #[arg(long, value_name = "URL", env = WEBHOOK_ENV_VAR, hide_env_values = true)]
    pub webhook_url: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let build = match &self.command {
            Command::Package(args) => &args.build,
            Command::Sign(build) | Command::Universal(build) => build,
        };

        if build.product_name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }

        Ok(())
    }
}

impl BuildArgs {
    /// Session log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.root.join("logs"))
    }

    /// Build context for `arch`.
    pub fn context_for(&self, arch: Arch) -> bundler::Result<BuildContext> {
        if !self.root.is_dir() {
            crate::bail!("repository root {} is not a directory", self.root.display());
        }

        let mut builder = BuildContext::builder(&self.root)
            .architecture(arch)
            .product_name(&self.product_name);
        if let Some(out_dir) = &self.out_dir {
            builder = builder.out_dir(out_dir);
        }
        if let Some(version) = &self.build_version {
            builder = builder.version(version);
        }
        builder.build()
    }

    /// Build context for the requested architecture.
    pub fn context(&self) -> bundler::Result<BuildContext> {
        self.context_for(self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_package_defaults() {
        let args = Args::try_parse_from(["browser_bundler", "package"]).unwrap();
        let Command::Package(pkg) = args.command else {
            panic!("expected package command");
        };
        assert_eq!(pkg.build.root, PathBuf::from("."));
        assert_eq!(pkg.build.arch, Arch::X64);
        assert_eq!(pkg.build.product_name, "BrowserOS");
        assert_eq!(pkg.build.log_dir(), PathBuf::from("./logs"));
        assert!(!pkg.notify);
    }

    #[test]
    fn test_rejects_unknown_arch() {
        assert!(Args::try_parse_from(["browser_bundler", "package", "--arch", "sparc"]).is_err());
    }

    #[test]
    fn test_notify_without_destination_is_valid() {
        let args = Args::try_parse_from([
            "browser_bundler",
            "package",
            "--notify",
            "--webhook-url",
            " ",
        ])
        .unwrap();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_blank_product_name_is_invalid() {
        let args =
            Args::try_parse_from(["browser_bundler", "sign", "--product-name", " "]).unwrap();
        assert!(args.validate().is_err());
    }
}
