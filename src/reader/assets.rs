use std::path::Path;

use super::AssetReader;
use super::session::LoadSession;
use crate::core::Result;
use crate::format::AssetResolver;
use crate::key::AssetKey;
use crate::model::ModelInfo;
use crate::scene::{AssetRef, MaterialId, NodeId, TextureId};

/// Loads extra resources into a model on behalf of a processor.
///
/// Everything loaded here is registered as a file-backed dependency of the
/// model, so the writer copies and rehomes it with the rest.
pub struct ModelAssets<'a> {
    reader: &'a AssetReader,
    info: &'a mut ModelInfo,
}

impl<'a> ModelAssets<'a> {
    pub fn new(reader: &'a AssetReader, info: &'a mut ModelInfo) -> Self {
        Self {
            reader,
            info,
        }
    }

    #[must_use]
    pub fn info(&self) -> &ModelInfo {
        self.info
    }

    pub fn model(&mut self) -> &mut ModelInfo {
        self.info
    }

    fn session(&self) -> Result<LoadSession> {
        Ok(LoadSession::seeded(self.reader.require_root()?, self.info.scene()))
    }

    pub fn load_texture(&mut self, key: AssetKey) -> Result<TextureId> {
        let mut session = self.session()?;
        let id = session.resolve_texture(self.info.scene_mut(), key)?;
        self.info.add_dependency(AssetRef::Texture(id));
        Ok(id)
    }

    /// Load the material document at `path`, relative to the source root.
    pub fn load_material(&mut self, path: &str) -> Result<MaterialId> {
        let key = AssetKey::material(path)?;
        let mut session = self.session()?;
        let id = session.resolve_material(self.info.scene_mut(), key)?;
        self.info.add_dependency(AssetRef::Material(id));
        self.register_material_textures(id)?;
        Ok(id)
    }

    /// Resolve a link node of the model, loading its target on demand.
    pub fn resolve_link(&mut self, link: NodeId) -> Result<NodeId> {
        self.reader.resolve_link(self.info.scene_mut(), link)
    }

    #[must_use]
    pub fn source_root(&self) -> Option<&Path> {
        self.reader.asset_root()
    }

    fn register_material_textures(&mut self, material: MaterialId) -> Result<()> {
        let textures: Vec<(String, TextureId)> = self
            .info
            .scene()
            .material(material)
            .map(|m| {
                m.params()
                    .iter()
                    .filter_map(|p| p.value.texture().map(|t| (p.name.clone(), t)))
                    .collect()
            })
            .unwrap_or_default();
        // Re-assigning records the parameter slot on the texture dependency
        for (param, texture) in textures {
            self.info.assign_texture(material, &param, texture)?;
        }
        Ok(())
    }
}
