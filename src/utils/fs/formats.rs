//! Reading and writing structured data files.
//!
//! Writes go through [`super::atomic::atomic_write`].

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use super::atomic::atomic_write;

/// Reads and deserializes a TOML file.
pub fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read TOML file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML file: {}", path.display()))
}

/// Serializes `data` as pretty-printed JSON and writes it atomically.
pub fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .with_context(|| format!("Failed to serialize data to JSON for: {}", path.display()))?;
    atomic_write(path, json.as_bytes())
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_write_json_creates_parents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/sample.json");
        let sample = Sample {
            name: "door".to_string(),
            count: 2,
        };
        write_json_file(&path, &sample).unwrap();
        let back: Sample = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_read_toml_reports_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.toml");
        fs::write(&path, "name = ").unwrap();
        let err = read_toml_file::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
