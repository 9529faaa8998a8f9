//! Source asset trees on disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A door: two panels sharing `mats/wood.mat`, and a handle with an inline
/// metal material.
pub const DOOR_MODEL: &str = r#"{
  "materials": [
    {"key": "mats/wood.mat"},
    {"inline": {"name": "Metal", "definition": "Unshaded", "params": [
      {"name": "ColorMap", "value": {"texture": {"key": "textures/metal.png"}}}
    ]}}
  ],
  "root": {"name": "door", "node": {"group": {"children": [
    {"name": "frame", "node": {"group": {"children": [
      {"name": "left", "node": {"geometry": {"material": 0}}},
      {"name": "right", "node": {"geometry": {"material": 0}}}
    ]}}},
    {"name": "handle", "transform": {"translation": [0.5, 1.0, 0.0]}, "node": {"group": {"children": [
      {"name": "knob", "node": {"geometry": {"material": 1}}}
    ]}}}
  ]}}}
}"#;

pub const WOOD_MATERIAL: &str = r#"name = "Wood"
definition = "Lighting"

[[params]]
name = "Shininess"
value = { float = 4.0 }

[[params]]
name = "DiffuseMap"
value = { texture = { key = "textures/wood.png" } }
"#;

pub const METAL_TEXTURE: &[u8] = b"metal-texture-bytes";
pub const WOOD_TEXTURE: &[u8] = b"wood-texture-bytes";

/// A temporary source root. Removed when dropped.
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create source tree")?;
        Ok(Self { dir })
    }

    /// The door model with its material and textures.
    pub fn door() -> Result<Self> {
        let tree = Self::new()?;
        tree.write("Models/door.scn", DOOR_MODEL)?;
        tree.write("mats/wood.mat", WOOD_MATERIAL)?;
        tree.write("textures/wood.png", WOOD_TEXTURE)?;
        tree.write("textures/metal.png", METAL_TEXTURE)?;
        Ok(tree)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn remove(&self, relative: &str) -> Result<()> {
        let path = self.path(relative);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }
}
