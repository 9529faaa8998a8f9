//! Conversion settings loaded from `scenec.toml`.
//!
//! Every field is optional. Values given on the command line take precedence
//! over the file.
//!
//! ```toml
//! source_root = "downloads/door"
//! target_root = "assets"
//! target_path = "Models/Door"
//! probe = "bd"
//!
//! [formats]
//! json = "scene"
//! ```
//!
//! The `[formats]` table maps extra file extensions onto a registered loader.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::convert::Convert;
use crate::reader::AssetReader;
use crate::utils::fs::read_toml_file;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_root: Option<PathBuf>,

    /// Prefix under the target root for everything written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,

    /// Probe option characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,

    /// Extension to loader name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formats: BTreeMap<String, String>,
}

impl ConvertConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        read_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Load `path` when given, which must exist, otherwise `scenec.toml` in
    /// the working directory if there is one.
    pub fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load_from(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Overlay `other` onto `self`; set fields in `other` win.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        if other.source_root.is_some() {
            self.source_root = other.source_root;
        }
        if other.target_root.is_some() {
            self.target_root = other.target_root;
        }
        if other.target_path.is_some() {
            self.target_path = other.target_path;
        }
        if other.probe.is_some() {
            self.probe = other.probe;
        }
        self.formats.extend(other.formats);
        self
    }

    /// Build a [`Convert`] pipeline from these settings.
    pub fn build(&self) -> Result<Convert> {
        let mut reader = AssetReader::default();
        reader
            .formats_mut()
            .apply(&self.formats)
            .context("Invalid [formats] table")?;
        if let Some(root) = &self.source_root {
            reader
                .set_asset_root(root)
                .with_context(|| format!("Invalid source root: {}", root.display()))?;
        }

        let mut convert = Convert::new(reader);
        if let Some(path) = &self.target_path {
            convert.set_target_asset_path(path.clone());
        }
        if let Some(root) = &self.target_root {
            convert.set_target_root(root.clone());
        }
        if let Some(probe) = &self.probe {
            convert.set_probe_options(probe);
        }
        Ok(convert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_full_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scenec.toml");
        fs::write(
            &path,
            r#"
source_root = "in"
target_root = "out"
target_path = "Models/Door"
probe = "bd"

[formats]
json = "scene"
"#,
        )
        .unwrap();

        let config = ConvertConfig::load_from(&path).unwrap();
        assert_eq!(config.source_root, Some(PathBuf::from("in")));
        assert_eq!(config.target_path.as_deref(), Some("Models/Door"));
        assert_eq!(config.formats.get("json").map(String::as_str), Some("scene"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scenec.toml");
        fs::write(&path, "source = \"in\"\n").unwrap();
        assert!(ConvertConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(ConvertConfig::load_with_optional(Some(&missing)).is_err());
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let file = ConvertConfig {
            source_root: Some("in".into()),
            target_root: Some("out".into()),
            probe: Some("b".into()),
            ..Default::default()
        };
        let flags = ConvertConfig {
            target_root: Some("elsewhere".into()),
            ..Default::default()
        };
        let merged = file.merged(flags);
        assert_eq!(merged.source_root, Some(PathBuf::from("in")));
        assert_eq!(merged.target_root, Some(PathBuf::from("elsewhere")));
        assert_eq!(merged.probe.as_deref(), Some("b"));
    }

    #[test]
    fn test_build_rejects_unknown_loader() {
        let mut config = ConvertConfig::default();
        config.formats.insert("fbx".into(), "autodesk".into());
        assert!(config.build().is_err());
    }

    #[test]
    fn test_build_configures_writer() {
        let temp = tempdir().unwrap();
        let config = ConvertConfig {
            source_root: Some(temp.path().to_path_buf()),
            target_root: Some(temp.path().join("out")),
            target_path: Some("Models".into()),
            ..Default::default()
        };
        let convert = config.build().unwrap();
        let writer = convert.writer().unwrap();
        assert_eq!(writer.asset_path(), Some("Models"));
        assert!(convert.reader().asset_root().is_some());
    }
}
