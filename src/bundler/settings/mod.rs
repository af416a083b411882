//! Build parameters, architecture mapping and the artifact manifest.

mod arch;
mod context;
pub mod manifest;
mod version;

pub use arch::Arch;
pub use context::{BuildContext, BuildContextBuilder};
pub use manifest::{EntryKind, FileManifestEntry};
pub use version::VersionInfo;
