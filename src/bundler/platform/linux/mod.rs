//! Linux packaging: AppDir assembly and AppImage creation.

pub mod appdir;
pub mod appimage;
pub mod tool;

pub use appdir::{AppDirAssembler, AppDirLayout};
pub use appimage::{PackagingPipeline, PipelineState, package_universal, sign_binaries};
pub use tool::{ToolAcquirer, ToolSpec};
