//! Writing a converted model into a target asset tree.
//!
//! The writer relocates every dependency of a model below `target_root`,
//! optionally under an asset path prefix, and rewrites keys so the written
//! scene refers to the new locations.
//!
//! # Passes
//!
//! 1. **Real dependencies** are copied from their source file to
//!    `prefix/original key` and rekeyed to that path.
//! 2. **Generated dependencies** are rekeyed to `prefix/current key`, then
//!    written by the generator registered for their kind. They run after the
//!    copies because their content refers to the keys set in pass 1.
//! 3. **The scene** is written to `prefix/<model name>.scn`.
//!
//! The first failure aborts the write. Files written before it stay on disk
//! and the scene itself is not written.

mod generators;

pub use generators::{DependencyGenerator, LinkedModelGenerator, MaterialGenerator};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::SCENE_EXTENSION;
use crate::convert::ModelProcessor;
use crate::core::{ConvertError, Result};
use crate::format::SceneDocument;
use crate::key::normalize_asset_path;
use crate::model::{Dependency, ModelInfo};
use crate::reader::ModelAssets;
use crate::scene::AssetKind;
use crate::utils::fs::{atomic_write, copy_file, with_extension};

/// Relocates a model and its dependencies into a target tree.
pub struct AssetWriter {
    target_root: PathBuf,
    asset_path: Option<String>,
    generators: HashMap<AssetKind, Box<dyn DependencyGenerator>>,
}

impl AssetWriter {
    /// A writer with the material and linked-model generators registered.
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        let mut generators: HashMap<AssetKind, Box<dyn DependencyGenerator>> = HashMap::new();
        generators.insert(AssetKind::Material, Box::new(MaterialGenerator));
        generators.insert(AssetKind::Link, Box::new(LinkedModelGenerator));
        Self {
            target_root: target_root.into(),
            asset_path: None,
            generators,
        }
    }

    #[must_use]
    pub fn with_asset_path(mut self, asset_path: impl Into<String>) -> Self {
        self.set_asset_path(Some(asset_path.into()));
        self
    }

    /// Prefix for every written path. An empty prefix means none.
    pub fn set_asset_path(&mut self, asset_path: Option<String>) {
        self.asset_path = asset_path.filter(|p| !p.trim_matches(&['/', '\\'][..]).is_empty());
    }

    pub fn set_target_root(&mut self, target_root: impl Into<PathBuf>) {
        self.target_root = target_root.into();
    }

    #[must_use]
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    #[must_use]
    pub fn asset_path(&self) -> Option<&str> {
        self.asset_path.as_deref()
    }

    pub fn register_generator(&mut self, kind: AssetKind, generator: Box<dyn DependencyGenerator>) {
        self.generators.insert(kind, generator);
    }

    pub fn unregister_generator(&mut self, kind: AssetKind) -> Option<Box<dyn DependencyGenerator>> {
        self.generators.remove(&kind)
    }

    /// `path` below the asset path prefix, as a normalized asset path.
    pub fn target_path(&self, path: &str) -> Result<String> {
        match &self.asset_path {
            Some(prefix) => normalize_asset_path(&format!("{prefix}/{path}")),
            None => normalize_asset_path(path),
        }
    }

    /// Write `info` into the target tree. Returns the path of the written
    /// scene document.
    pub fn write(&self, info: &mut ModelInfo) -> Result<PathBuf> {
        let dependencies: Vec<Dependency> = info.dependencies().cloned().collect();
        let (generated, real): (Vec<_>, Vec<_>) =
            dependencies.iter().partition(|d| d.is_generated());
        debug!("Writing {} real and {} generated dependencies", real.len(), generated.len());

        for dependency in real {
            self.copy_dependency(info, dependency)?;
        }

        let mut pending = Vec::with_capacity(generated.len());
        for dependency in generated {
            let current = info
                .current_key(dependency)
                .cloned()
                .unwrap_or_else(|| dependency.original_key().clone());
            let path = self.target_path(&current.render())?;
            info.set_key(dependency.asset(), current.rehome(&path)?)?;
            pending.push((dependency, self.target_root.join(&path)));
        }
        for (dependency, file) in pending {
            let generator = self
                .generators
                .get(&dependency.asset().kind())
                .ok_or_else(|| ConvertError::UnsupportedDependencyKind {
                    key: dependency.original_key().render(),
                    kind: dependency.asset().kind_label().to_string(),
                })?;
            generator.generate(info, dependency, &file)?;
        }

        let scene_path = self.target_path(&with_extension(info.name(), SCENE_EXTENSION))?;
        let out = self.target_root.join(scene_path);
        info!("Writing: {}", out.display());
        let document = SceneDocument::from_subtree(info.scene(), info.root())?;
        atomic_write(&out, document.to_json(&out)?.as_bytes())
            .map_err(|e| ConvertError::io(info.name(), "writing scene", &out, e))?;
        Ok(out)
    }

    fn copy_dependency(&self, info: &mut ModelInfo, dependency: &Dependency) -> Result<()> {
        let Some(source) = dependency.source_file() else {
            return Ok(());
        };
        let key = dependency.original_key();
        let path = self.target_path(&key.render())?;

        if !source.is_file() {
            return Err(ConvertError::ResourceNotFound {
                key: key.render(),
                path: source.to_path_buf(),
            });
        }

        let target = self.target_root.join(&path);
        info!("Copying: {} to: {}", source.display(), target.display());
        copy_file(source, &target)
            .map_err(|e| ConvertError::io(key.render(), "copying resource", &target, e))?;

        info.set_key(dependency.asset(), key.rehome(&path)?)
    }
}

impl std::fmt::Debug for AssetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.generators.keys().map(AssetKind::label).collect();
        kinds.sort_unstable();
        f.debug_struct("AssetWriter")
            .field("target_root", &self.target_root)
            .field("asset_path", &self.asset_path)
            .field("generators", &kinds)
            .finish()
    }
}

impl ModelProcessor for AssetWriter {
    fn apply(&mut self, assets: &mut ModelAssets<'_>) -> Result<()> {
        self.write(assets.model()).map(|_| ())
    }
}
