//! Version files kept at the repository root.
//!
//! - `CHROMIUM_VERSION`: `MAJOR=`, `MINOR=`, `BUILD=`, `PATCH=` lines.
//! - `build/config/NXTSCAPE_VERSION`: the product's own build offset.
//!
//! Missing or malformed files yield empty strings; only packaging decides
//! whether an empty version is acceptable.

use std::collections::HashMap;
use std::path::Path;

/// Versions read from the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// Upstream Chromium version, `MAJOR.MINOR.BUILD.PATCH`.
    pub chromium: String,
    /// Product version offset as written in the version file.
    pub product: String,
    /// Chromium version with `BUILD` advanced by the product offset.
    pub combined: String,
}

impl VersionInfo {
    /// Reads both version files under `root_dir`.
    pub fn load(root_dir: &Path) -> Self {
        let chromium_fields = std::fs::read_to_string(root_dir.join("CHROMIUM_VERSION"))
            .map(|text| parse_key_values(&text))
            .unwrap_or_default();

        let product = std::fs::read_to_string(
            root_dir.join("build").join("config").join("NXTSCAPE_VERSION"),
        )
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

        Self::from_parts(&chromium_fields, product)
    }

    fn from_parts(fields: &HashMap<String, String>, product: String) -> Self {
        let part = |key: &str| fields.get(key).map(String::as_str);

        let (chromium, combined) = match (
            part("MAJOR"),
            part("MINOR"),
            part("BUILD"),
            part("PATCH"),
        ) {
            (Some(major), Some(minor), Some(build), Some(patch)) => {
                let chromium = format!("{major}.{minor}.{build}.{patch}");
                let combined = match (build.parse::<u64>(), product.parse::<u64>()) {
                    (Ok(build), Ok(offset)) => {
                        format!("{major}.{minor}.{}.{patch}", build + offset)
                    }
                    _ => String::new(),
                };
                (chromium, combined)
            }
            _ => (String::new(), String::new()),
        };

        Self {
            chromium,
            product,
            combined,
        }
    }

    /// Version used in artifact names: the product version.
    ///
    /// The Chromium and combined versions are informational only.
    pub fn display_version(&self) -> &str {
        &self.product
    }
}

fn parse_key_values(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_combines_build_number() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("CHROMIUM_VERSION"),
            "MAJOR=137\nMINOR=0\nBUILD=7151\nPATCH=69\n",
        )
        .unwrap();
        let config = dir.path().join("build").join("config");
        std::fs::create_dir_all(&config).unwrap();
        std::fs::write(config.join("NXTSCAPE_VERSION"), "42\n").unwrap();

        let info = VersionInfo::load(dir.path());
        assert_eq!(info.chromium, "137.0.7151.69");
        assert_eq!(info.product, "42");
        assert_eq!(info.combined, "137.0.7193.69");
        assert_eq!(info.display_version(), "42");
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let info = VersionInfo::load(dir.path());
        assert_eq!(info, VersionInfo::default());
        assert_eq!(info.display_version(), "");
    }

    #[test]
    fn test_non_numeric_product_keeps_chromium_version() {
        let fields = parse_key_values("MAJOR=1\nMINOR=2\nBUILD=3\nPATCH=4");
        let info = VersionInfo::from_parts(&fields, "beta 1".into());
        assert_eq!(info.chromium, "1.2.3.4");
        assert!(info.combined.is_empty());
        assert_eq!(info.display_version(), "beta 1");
    }
}
