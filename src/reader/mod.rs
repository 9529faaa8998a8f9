//! Loading models from a source asset tree.
//!
//! Every path a model refers to is resolved against the source root, so the
//! root is canonicalized once and model files are located relative to it.

mod assets;
mod session;

pub use assets::ModelAssets;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::{ConvertError, Result};
use crate::format::FormatRegistry;
use crate::scene::{NodeId, Scene};
use crate::utils::fs::{canonicalize_dir, relativize, to_asset_path};
use session::LoadSession;

/// Reads models and their resources from a source root.
#[derive(Debug, Clone, Default)]
pub struct AssetReader {
    root: Option<PathBuf>,
    formats: FormatRegistry,
}

impl AssetReader {
    /// A reader rooted at `root` with the default format table.
    pub fn new(root: &Path) -> Result<Self> {
        let mut reader = Self::default();
        reader.set_asset_root(root)?;
        Ok(reader)
    }

    #[must_use]
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Set the source root. The directory must exist; it is stored in
    /// canonical form.
    pub fn set_asset_root(&mut self, root: &Path) -> Result<()> {
        let canonical = canonicalize_dir(root).map_err(|e| {
            ConvertError::config(format!("source root {} is not usable: {e}", root.display()))
        })?;
        info!("Using source asset root: {}", canonical.display());
        self.root = Some(canonical);
        Ok(())
    }

    #[must_use]
    pub fn asset_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[must_use]
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        &mut self.formats
    }

    fn require_root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or_else(|| ConvertError::config("asset root is not set"))
    }

    /// The asset path of `file` relative to the source root.
    pub fn asset_path(&self, file: &Path) -> Result<String> {
        let root = self.require_root()?;
        let canonical = file.canonicalize().map_err(|e| {
            ConvertError::invalid_argument(format!(
                "model file {} cannot be resolved: {e}",
                file.display()
            ))
        })?;
        let relative = relativize(root, &canonical).ok_or_else(|| {
            ConvertError::invalid_argument(format!(
                "model file {} is outside the source root {}",
                file.display(),
                root.display()
            ))
        })?;
        Ok(to_asset_path(&relative))
    }

    /// Load a model file, which must live below the source root.
    pub fn load_model(&self, file: &Path) -> Result<Scene> {
        let root = self.require_root()?;
        debug!("load_model({})", file.display());
        if !file.exists() {
            return Err(ConvertError::invalid_argument(format!(
                "model file does not exist: {}",
                file.display()
            )));
        }

        let path = self.asset_path(file)?;
        info!("Loading asset: {path}");

        let source = root.join(&path);
        let document = self.formats.loader_for(&source)?.read(&source)?;
        let mut session = LoadSession::new(root);
        document.into_scene(&mut session, &source)
    }

    /// Load the target of link node `link` and attach it as the link's child.
    ///
    /// A link that already has a child is left alone and its first child is
    /// returned. Keyed resources already in `scene` are shared with the
    /// loaded sub-tree.
    pub fn resolve_link(&self, scene: &mut Scene, link: NodeId) -> Result<NodeId> {
        let root = self.require_root()?;
        let key = scene
            .node(link)
            .and_then(|n| n.link_key())
            .cloned()
            .ok_or_else(|| ConvertError::invalid_argument("node is not a link"))?;
        if let Some(child) = scene.children(link).first() {
            return Ok(*child);
        }

        let source = root.join(key.render());
        if !source.is_file() {
            return Err(ConvertError::ResourceNotFound {
                key: key.render(),
                path: source,
            });
        }
        debug!("Resolving link {key}");
        let document = self.formats.loader_for(&source)?.read(&source)?;
        let mut session = LoadSession::seeded(root, scene);
        document.graft(scene, link, &mut session, &source)
    }
}
