//! Document formats and the extension dispatch table.
//!
//! Models are read through a [`ModelLoader`] picked by file extension from a
//! [`FormatRegistry`]. Loaders only parse; turning a [`SceneDocument`] into
//! scene nodes happens through an [`AssetResolver`], which decides how keyed
//! materials and textures are found and shared.

pub mod material_doc;
pub mod scene_doc;

pub use material_doc::{MaterialDocument, ParamDocument, TextureDocument, ValueDocument};
pub use scene_doc::{MaterialEntry, NodeBody, NodeDocument, SCENE_DOCUMENT_VERSION, SceneDocument};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::constants::SCENE_EXTENSION;
use crate::core::{ConvertError, Result};
use crate::key::AssetKey;
use crate::scene::{MaterialId, Scene, TextureId};

/// Looks up keyed resources while a document is instantiated.
pub trait AssetResolver {
    fn resolve_material(&mut self, scene: &mut Scene, key: AssetKey) -> Result<MaterialId>;
    fn resolve_texture(&mut self, scene: &mut Scene, key: AssetKey) -> Result<TextureId>;
}

/// Parses a model file into a scene document.
pub trait ModelLoader {
    /// Name used to refer to the loader from the `[formats]` table
    fn name(&self) -> &'static str;

    fn read(&self, path: &Path) -> Result<SceneDocument>;
}

/// Loader for native `.scn` scene documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneLoader;

impl ModelLoader for SceneLoader {
    fn name(&self) -> &'static str {
        "scene"
    }

    fn read(&self, path: &Path) -> Result<SceneDocument> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::io(path.display().to_string(), "reading scene document", path, e)
        })?;
        SceneDocument::parse(&content, path)
    }
}

/// Reads a material document from disk.
pub fn read_material(path: &Path) -> Result<MaterialDocument> {
    let content = fs::read_to_string(path).map_err(|e| {
        ConvertError::io(path.display().to_string(), "reading material document", path, e)
    })?;
    MaterialDocument::parse(&content, path)
}

/// Extension to loader table. Extensions are matched case-insensitively.
#[derive(Clone)]
pub struct FormatRegistry {
    loaders: Vec<Arc<dyn ModelLoader>>,
    extensions: BTreeMap<String, usize>,
}

impl FormatRegistry {
    /// A registry with no extensions mapped.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Map `extension` to `loader`, replacing any previous mapping.
    pub fn register(&mut self, extension: &str, loader: Arc<dyn ModelLoader>) {
        let index = match self.loaders.iter().position(|l| l.name() == loader.name()) {
            Some(index) => index,
            None => {
                self.loaders.push(loader);
                self.loaders.len() - 1
            }
        };
        self.extensions.insert(normalize_extension(extension), index);
    }

    /// Map `extension` to an already known loader by name.
    pub fn alias(&mut self, extension: &str, loader: &str) -> Result<()> {
        let index = self.loaders.iter().position(|l| l.name() == loader).ok_or_else(|| {
            ConvertError::config(format!(
                "unknown loader '{loader}' for extension '{extension}' (known: {})",
                self.loader_names().join(", ")
            ))
        })?;
        self.extensions.insert(normalize_extension(extension), index);
        Ok(())
    }

    /// Apply an `extension = "loader"` table, as found under `[formats]`.
    pub fn apply(&mut self, table: &BTreeMap<String, String>) -> Result<()> {
        for (extension, loader) in table {
            self.alias(extension, loader)?;
        }
        Ok(())
    }

    pub fn loader_for(&self, path: &Path) -> Result<&dyn ModelLoader> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        self.extensions
            .get(&extension)
            .map(|index| self.loaders[*index].as_ref())
            .ok_or_else(|| ConvertError::UnsupportedFormat {
                extension,
                path: path.to_path_buf(),
            })
    }

    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    fn loader_names(&self) -> Vec<&'static str> {
        self.loaders.iter().map(|l| l.name()).collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SCENE_EXTENSION, Arc::new(SceneLoader));
        registry
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table: BTreeMap<_, _> = self
            .extensions
            .iter()
            .map(|(ext, index)| (ext.as_str(), self.loaders[*index].name()))
            .collect();
        f.debug_struct("FormatRegistry").field("extensions", &table).finish()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
