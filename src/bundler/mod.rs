//! Browser packaging core.
//!
//! Turns the output directory of a Chromium-based browser build into a
//! single-file AppImage.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`Logger`] | Session log file plus colored console mirror |
//! | [`CommandExecutor`] | Runs a child process, streaming and capturing its merged output |
//! | [`NotificationDispatcher`] | Optional webhook status reports |
//! | [`ToolAcquirer`] | Fetches and caches appimagetool |
//! | [`AppDirAssembler`] | Lays out the AppDir from the build output |
//! | [`PackagingPipeline`] | Drives one packaging run end to end |
//!
//! # Integration
//!
//! ```no_run
//! use browser_bundler::bundler::{Arch, BuildContext, Logger, PackagingPipeline};
//!
//! # async fn run() -> browser_bundler::bundler::Result<()> {
//! let logger = Logger::open("logs");
//! let mut ctx = BuildContext::builder("/src/browser")
//!     .architecture(Arch::X64)
//!     .product_name("BrowserOS")
//!     .build()?;
//!
//! if PackagingPipeline::new(&logger).package(&mut ctx).await? {
//!     println!("{}", ctx.package_path().unwrap().display());
//! }
//! logger.close()
//! # }
//! ```

#![warn(missing_docs)]

mod error;
pub mod logging;
pub mod notify;
pub mod platform;
pub mod process;
pub mod settings;
pub mod utils;

// Public re-exports
pub use error::{CommandFailure, Context, Error, ErrorExt, Result};
pub use logging::{Level, Logger};
pub use notify::NotificationDispatcher;
pub use platform::linux::{
    AppDirAssembler, PackagingPipeline, PipelineState, ToolAcquirer, ToolSpec,
};
pub use process::{CommandExecutor, CommandResult, ExecOptions};
pub use settings::{Arch, BuildContext, FileManifestEntry, VersionInfo};
