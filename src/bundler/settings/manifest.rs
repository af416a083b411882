//! Artifacts copied from the build output into the bundle.

/// Whether a manifest entry names a file or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Single file, copied over any existing destination.
    File,
    /// Directory tree, merged into any existing destination.
    Directory,
}

/// One artifact expected in the build output directory.
///
/// `required` selects how loudly a missing entry is reported: required
/// entries log a warning, optional ones a debug note. Neither aborts
/// assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileManifestEntry {
    /// Name relative to the build output directory.
    pub name: &'static str,
    /// File or directory.
    pub kind: EntryKind,
    /// Report absence as a warning.
    pub required: bool,
}

impl FileManifestEntry {
    /// A required file.
    pub const fn file(name: &'static str) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            required: true,
        }
    }

    /// An optional directory tree.
    pub const fn directory(name: &'static str) -> Self {
        Self {
            name,
            kind: EntryKind::Directory,
            required: false,
        }
    }
}

/// Main browser executable.
pub const MAIN_BINARY: &str = "chrome";

/// Crash reporting helper.
pub const CRASH_HANDLER: &str = "chrome_crashpad_handler";

/// Setuid sandbox helper.
pub const SANDBOX_HELPER: &str = "chrome_sandbox";

/// Binaries, shared libraries, data blobs and resource packs.
pub const BROWSER_FILES: &[FileManifestEntry] = &[
    FileManifestEntry::file(MAIN_BINARY),
    FileManifestEntry::file(CRASH_HANDLER),
    FileManifestEntry::file(SANDBOX_HELPER),
    FileManifestEntry::file("chromedriver"),
    FileManifestEntry::file("libEGL.so"),
    FileManifestEntry::file("libGLESv2.so"),
    FileManifestEntry::file("libvk_swiftshader.so"),
    FileManifestEntry::file("libvulkan.so.1"),
    FileManifestEntry::file("vk_swiftshader_icd.json"),
    FileManifestEntry::file("icudtl.dat"),
    FileManifestEntry::file("snapshot_blob.bin"),
    FileManifestEntry::file("v8_context_snapshot.bin"),
    FileManifestEntry::file("chrome_100_percent.pak"),
    FileManifestEntry::file("chrome_200_percent.pak"),
    FileManifestEntry::file("resources.pak"),
];

/// Locale data and auxiliary preload data.
pub const BROWSER_DIRECTORIES: &[FileManifestEntry] = &[
    FileManifestEntry::directory("locales"),
    FileManifestEntry::directory("MEIPreload"),
];

/// Exact permission bits applied after copying.
///
/// The sandbox helper does not work without its setuid bit.
pub const PERMISSIONS: &[(&str, u32)] = &[
    (MAIN_BINARY, 0o755),
    (CRASH_HANDLER, 0o755),
    (SANDBOX_HELPER, 0o4755),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_kinds() {
        assert!(BROWSER_FILES.iter().all(|e| e.kind == EntryKind::File && e.required));
        assert!(BROWSER_DIRECTORIES.iter().all(|e| e.kind == EntryKind::Directory));
    }

    #[test]
    fn test_only_sandbox_is_setuid() {
        for (name, mode) in PERMISSIONS {
            assert_eq!(*mode & 0o4000 != 0, *name == SANDBOX_HELPER);
        }
    }
}
