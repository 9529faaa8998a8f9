//! Location part of an asset key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{ConvertError, Result};

/// Immutable location of an external resource: logical folder, base name and
/// extension.
///
/// Keys are values. Two resources carrying equal keys are still distinct
/// resources; deduplication happens on resource identity, never here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    folder: String,
    name: String,
    extension: String,
}

impl ResourceKey {
    /// Parse an asset path into a key.
    ///
    /// The path is normalized first (see [`normalize_asset_path`]), then split
    /// on the last `/` into folder and file name, and the file name on its last
    /// `.` into name and extension.
    pub fn parse(path: &str) -> Result<Self> {
        let normalized = normalize_asset_path(path)?;

        let (folder, file_name) = match normalized.rfind('/') {
            Some(idx) => (&normalized[..idx], &normalized[idx + 1..]),
            None => ("", normalized.as_str()),
        };

        let (name, extension) = match file_name.rfind('.') {
            Some(idx) => (&file_name[..idx], &file_name[idx + 1..]),
            None => (file_name, ""),
        };

        Ok(Self {
            folder: folder.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
        })
    }

    /// Render as `folder/name.extension`, omitting the separator for an empty
    /// folder and the dot for an empty extension.
    #[must_use]
    pub fn render(&self) -> String {
        let file_name = self.file_name();
        if self.folder.is_empty() {
            file_name
        } else {
            format!("{}/{}", self.folder, file_name)
        }
    }

    /// Produce a new key at `new_path`. Nothing is inherited from `self`.
    pub fn rehome(&self, new_path: &str) -> Result<Self> {
        Self::parse(new_path)
    }

    /// `name.extension`
    #[must_use]
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for ResourceKey {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.render()
    }
}

/// Normalize an asset path.
///
/// Backslashes become `/`, empty and `.` segments are dropped and `..` removes
/// the previous segment. Asset paths are always relative, so a leading `/` is
/// dropped as well.
///
/// Fails for an empty path, a path naming a directory (trailing separator or
/// ending in `.`/`..`) and a `..` that climbs above the asset root.
pub fn normalize_asset_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    if unified.trim().is_empty() {
        return Err(ConvertError::invalid_argument("asset path is empty"));
    }

    let last = unified.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last == "." || last == ".." {
        return Err(ConvertError::invalid_argument(format!(
            "asset path '{path}' does not name a file"
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ConvertError::invalid_argument(format!(
                        "asset path '{path}' escapes the asset root"
                    )));
                }
            }
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}
