//! File system utilities for bundling.
//!
//! Copies overwrite existing destinations and directory copies merge into
//! existing trees, so assembling into a populated bundle twice yields the
//! same result as assembling once.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Copies a regular file, replacing any existing destination and creating
/// missing parent directories.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    // A symlink at the destination would redirect the copy elsewhere.
    if fs::symlink_metadata(to)
        .await
        .is_ok_and(|m| m.file_type().is_symlink())
    {
        fs::remove_file(to).await.fs_context("removing symlink", to)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}

/// Recursively merges the tree at `from` into `to`.
///
/// Existing files are overwritten, existing directories are kept and
/// symlinks are recreated. Files present only at the destination survive.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a directory")));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || merge_tree(&from, &to))
        .await
        .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}

fn merge_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path())
                .fs_context("reading symlink", entry.path())?;
            replace_non_dir(&dest_path)?;
            std::os::unix::fs::symlink(&target, &dest_path)
                .fs_context("creating symlink", &dest_path)?;
        } else if file_type.is_dir() {
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            replace_symlink(&dest_path)?;
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file", &dest_path)?;
        }
    }
    Ok(())
}

/// Clears a file or symlink at `path` so a symlink can be created there.
fn replace_non_dir(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Err(Error::GenericError(format!(
            "cannot replace directory {} with a symlink",
            path.display()
        ))),
        Ok(_) => std::fs::remove_file(path).fs_context("removing file", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Fs {
            context: "inspecting",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

fn replace_symlink(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::remove_file(path).fs_context("removing symlink", path)
        }
        _ => Ok(()),
    }
}

/// Sets exact Unix permission bits, including setuid/setgid/sticky.
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .fs_context("setting permissions on", path)
}

/// Writes `contents` to `path` and applies `mode`.
pub async fn write_with_mode(path: &Path, contents: &str, mode: u32) -> Result<()> {
    fs::write(path, contents).await.fs_context("writing", path)?;
    set_mode(path, mode).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_dir_merges_into_existing_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::create_dir_all(src.path().join("nested")).unwrap();
        std::fs::write(src.path().join("a.pak"), "new").unwrap();
        std::fs::write(src.path().join("nested/b.pak"), "b").unwrap();
        std::os::unix::fs::symlink("a.pak", src.path().join("link.pak")).unwrap();

        std::fs::write(dst.path().join("a.pak"), "old").unwrap();
        std::fs::write(dst.path().join("keep.pak"), "keep").unwrap();

        copy_dir(src.path(), dst.path()).await.unwrap();
        // Second merge must not fail on the existing symlink
        copy_dir(src.path(), dst.path()).await.unwrap();

        assert_eq!(std::fs::read_to_string(dst.path().join("a.pak")).unwrap(), "new");
        assert_eq!(std::fs::read_to_string(dst.path().join("nested/b.pak")).unwrap(), "b");
        assert_eq!(std::fs::read_to_string(dst.path().join("keep.pak")).unwrap(), "keep");
        assert_eq!(
            std::fs::read_link(dst.path().join("link.pak")).unwrap(),
            Path::new("a.pak")
        );
    }

    #[tokio::test]
    async fn test_copy_file_rejects_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = copy_file(&dir.path().join("missing"), &dir.path().join("out")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_dir_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("AppDir");
        std::fs::create_dir_all(target.join("opt")).unwrap();

        remove_dir_all(&target).await.unwrap();
        remove_dir_all(&target).await.unwrap();
        assert!(!target.exists());
    }
}
