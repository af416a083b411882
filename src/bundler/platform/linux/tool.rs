//! Local cache of the external AppImage bundler.

use crate::bundler::{
    logging::Logger,
    utils::{fs, http},
};
use std::path::{Path, PathBuf};

const APPIMAGETOOL_BASE_URL: &str =
    "https://github.com/AppImage/AppImageKit/releases/download/continuous";

/// Where a tool comes from and what it is called in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// File name inside the cache directory.
    pub file_name: String,
    /// Download location.
    pub url: String,
}

impl ToolSpec {
    /// Tool fetched from `url` and cached as `file_name`.
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: url.into(),
        }
    }

    /// appimagetool build able to run on this machine.
    pub fn appimagetool() -> Self {
        let host = match std::env::consts::ARCH {
            "aarch64" => "aarch64",
            _ => "x86_64",
        };
        let file_name = format!("appimagetool-{host}.AppImage");
        let url = format!("{APPIMAGETOOL_BASE_URL}/{file_name}");
        Self { file_name, url }
    }
}

/// Fetches external tools on first use.
#[derive(Debug, Clone, Copy)]
pub struct ToolAcquirer<'a> {
    logger: &'a Logger,
}

impl<'a> ToolAcquirer<'a> {
    /// Creates an acquirer that records through `logger`.
    pub fn new(logger: &'a Logger) -> Self {
        Self { logger }
    }

    /// Returns the cached tool, downloading it into `cache_dir` if needed.
    ///
    /// An existing file is returned as-is. A failed fetch is logged and
    /// yields `None`; deciding whether that is fatal is up to the caller.
    pub async fn ensure_tool(
        &self,
        cache_dir: &Path,
        tool_name: &str,
        source_url: &str,
    ) -> Option<PathBuf> {
        let tool_path = cache_dir.join(tool_name);

        if tool_path.is_file() {
            self.logger.info(&format!("✓ {tool_name} already available"));
            return Some(tool_path);
        }

        if let Err(e) = tokio::fs::create_dir_all(cache_dir).await {
            self.logger.error(&format!(
                "Failed to create tool cache {}: {}",
                cache_dir.display(),
                e
            ));
            return None;
        }

        self.logger.info(&format!("📥 Downloading {tool_name}..."));
        let fetched = match http::download_to_file(source_url, &tool_path).await {
            Ok(bytes) => {
                log::debug!("Fetched {} bytes from {}", bytes, source_url);
                fs::set_mode(&tool_path, 0o755).await
            }
            Err(e) => Err(e),
        };

        match fetched {
            Ok(()) => {
                self.logger.success(&format!("Downloaded {tool_name}"));
                Some(tool_path)
            }
            Err(e) => {
                self.logger.error(&format!("Failed to download {tool_name}: {e}"));
                let _ = tokio::fs::remove_file(&tool_path).await;
                None
            }
        }
    }

    /// [`Self::ensure_tool`] for a [`ToolSpec`].
    pub async fn ensure(&self, cache_dir: &Path, spec: &ToolSpec) -> Option<PathBuf> {
        self.ensure_tool(cache_dir, &spec.file_name, &spec.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appimagetool_spec_matches_url() {
        let spec = ToolSpec::appimagetool();
        assert!(spec.file_name.starts_with("appimagetool-"));
        assert!(spec.url.ends_with(&spec.file_name));
        assert!(spec.url.starts_with(APPIMAGETOOL_BASE_URL));
    }

    #[tokio::test]
    async fn test_cached_tool_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::open(dir.path().join("logs")).with_console(false);
        let cache = dir.path().join("tools");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("appimagetool"), "cached").unwrap();

        // An unreachable URL proves no fetch happens
        let path = ToolAcquirer::new(&logger)
            .ensure_tool(&cache, "appimagetool", "http://127.0.0.1:9/appimagetool")
            .await
            .unwrap();

        assert_eq!(path, cache.join("appimagetool"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_failed_fetch_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::open(dir.path().join("logs")).with_console(false);
        let cache = dir.path().join("tools");

        let result = ToolAcquirer::new(&logger)
            .ensure_tool(&cache, "appimagetool", "http://127.0.0.1:9/appimagetool")
            .await;

        assert!(result.is_none());
        assert!(!cache.join("appimagetool").exists());
        let log = std::fs::read_to_string(logger.path()).unwrap();
        assert!(log.contains("ERROR: Failed to download appimagetool"));
    }
}
