use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::{ConvertError, Result};
use crate::format::{AssetResolver, read_material};
use crate::key::{AssetKey, ResourceKey};
use crate::scene::{MaterialId, Scene, Texture, TextureId};

/// Resolves keyed resources below a source root for one load.
///
/// Repeated references to the same key resolve to the same instance, which is
/// what lets dependency discovery merge them afterwards.
pub(crate) struct LoadSession {
    root: PathBuf,
    materials: HashMap<ResourceKey, MaterialId>,
    textures: HashMap<AssetKey, TextureId>,
}

impl LoadSession {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            materials: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    /// A session that reuses the keyed resources already present in `scene`.
    pub(crate) fn seeded(root: &Path, scene: &Scene) -> Self {
        let mut session = Self::new(root);
        for (id, material) in scene.materials() {
            if let Some(key) = &material.key {
                session.materials.entry(key.location().clone()).or_insert(id);
            }
        }
        for (id, texture) in scene.textures() {
            if let Some(key) = &texture.key {
                session.textures.entry(key.clone()).or_insert(id);
            }
        }
        session
    }

    fn source_path(&self, key: &AssetKey) -> PathBuf {
        self.root.join(key.render())
    }
}

impl AssetResolver for LoadSession {
    fn resolve_material(&mut self, scene: &mut Scene, key: AssetKey) -> Result<MaterialId> {
        if let Some(id) = self.materials.get(key.location()) {
            return Ok(*id);
        }

        let path = self.source_path(&key);
        if !path.is_file() {
            return Err(ConvertError::ResourceNotFound {
                key: key.render(),
                path,
            });
        }
        debug!("Loading material {}", key);
        let document = read_material(&path)?;
        let location = key.location().clone();
        let id = document.instantiate(scene, self, Some(key))?;
        self.materials.insert(location, id);
        Ok(id)
    }

    /// Textures are referenced, never decoded, so a missing texture file is
    /// only noticed when the writer copies it.
    fn resolve_texture(&mut self, scene: &mut Scene, key: AssetKey) -> Result<TextureId> {
        let id = *self
            .textures
            .entry(key.clone())
            .or_insert_with(|| scene.add_texture(Texture::new(key)));
        Ok(id)
    }
}
