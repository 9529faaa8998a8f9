//! Per-conversion model state.
//!
//! [`ModelInfo`] owns the loaded [`Scene`] and the [`DependencyGraph`] built
//! from it. Processors query and edit the model through it, and the writer
//! consumes it at the end of a conversion.

mod dependency;
mod extract;
mod report;

pub use dependency::{Dependency, DependencyGraph};
pub use report::{ConversionReport, ReportEntry};

use std::path::{Path, PathBuf};

use crate::core::{ConvertError, Result};
use crate::key::AssetKey;
use crate::scene::{AssetRef, AssetSlot, MaterialId, Node, NodeId, NodeKind, ParamValue, Scene, TextureId};

/// A model being converted.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    source_root: PathBuf,
    name: String,
    scene: Scene,
    dependencies: DependencyGraph,
}

impl ModelInfo {
    /// Take ownership of `scene` and discover its dependencies relative to
    /// `source_root`.
    pub fn new(source_root: impl Into<PathBuf>, name: impl Into<String>, scene: Scene) -> Self {
        let source_root = source_root.into();
        let dependencies = DependencyGraph::discover(&scene, &source_root);
        Self {
            source_root,
            name: name.into(),
            scene,
            dependencies,
        }
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene.
    ///
    /// Changing which material or texture a slot uses through this bypasses
    /// the dependency graph; use [`Self::assign_material`] and
    /// [`Self::assign_texture`] for that.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    /// All nodes named `name`, breadth-first so that nodes higher in the tree
    /// come first.
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<NodeId> {
        self.find_all_of(|node| node.name.as_deref() == Some(name))
    }

    /// The first breadth-first match for `name`.
    #[must_use]
    pub fn find_first(&self, name: &str) -> Option<NodeId> {
        self.find_all(name).into_iter().next()
    }

    /// All nodes accepted by `filter`, breadth-first.
    pub fn find_all_of(&self, filter: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.scene
            .breadth_first(self.scene.root())
            .into_iter()
            .filter(|id| self.scene.node(*id).is_some_and(&filter))
            .collect()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    #[must_use]
    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependencies
    }

    #[must_use]
    pub fn dependency(&self, asset: AssetRef) -> Option<&Dependency> {
        self.dependencies.get(asset)
    }

    /// Current key of a dependency.
    #[must_use]
    pub fn current_key(&self, dependency: &Dependency) -> Option<&AssetKey> {
        dependency.current_key(&self.scene)
    }

    /// Rekey a dependency. Every slot referencing it sees the new key.
    pub fn set_key(&mut self, asset: AssetRef, key: AssetKey) -> Result<()> {
        let dependency = self.dependencies.get(asset).ok_or_else(|| {
            ConvertError::invalid_argument(format!("{} is not a dependency", asset.kind_label()))
        })?;
        dependency.set_key(&mut self.scene, key)
    }

    /// Register a resource loaded on behalf of a processor as a file-backed
    /// dependency. Resources without a key are ignored.
    ///
    /// The dependency is pinned: it is written even while no slot uses it.
    pub fn add_dependency(&mut self, asset: AssetRef) {
        if let Some(key) = self.scene.asset_key(asset).cloned() {
            self.dependencies.record_real(asset, &key, &self.source_root, None);
            self.dependencies.pin(asset);
        }
    }

    /// Give geometry `node` a new material (or none), keeping the dependency
    /// slots in step.
    pub fn assign_material(&mut self, node: NodeId, material: Option<MaterialId>) -> Result<()> {
        let slot = AssetSlot::GeometryMaterial(node);
        let previous = match self.scene.node_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Geometry(geometry)) => std::mem::replace(&mut geometry.material, material),
            _ => {
                return Err(ConvertError::invalid_argument(
                    "materials can only be assigned to geometry nodes",
                ));
            }
        };

        self.dependencies.remove_instance(&slot);
        if let Some(previous) = previous.filter(|m| Some(*m) != material) {
            self.release_material(previous);
        }
        if let Some(material) = material {
            self.register_slot(AssetRef::Material(material), slot);
        }
        Ok(())
    }

    /// Drop the texture slots of a material no geometry uses any more.
    fn release_material(&mut self, material: MaterialId) {
        if self.dependency(AssetRef::Material(material)).is_some_and(Dependency::is_pinned) {
            return;
        }
        let in_use = self.scene.depth_first(self.scene.root()).into_iter().any(|id| {
            self.scene.node(id).and_then(Node::material) == Some(material)
        });
        if !in_use {
            self.dependencies.retain_instances(
                |slot| !matches!(slot, AssetSlot::MaterialParam { material: m, .. } if *m == material),
            );
        }
    }

    /// Set texture parameter `param` of `material`, keeping the dependency
    /// slots in step.
    pub fn assign_texture(&mut self, material: MaterialId, param: &str, texture: TextureId) -> Result<()> {
        if self.scene.texture(texture).is_none() {
            return Err(ConvertError::invalid_argument("texture does not exist"));
        }
        let target = self
            .scene
            .material_mut(material)
            .ok_or_else(|| ConvertError::invalid_argument("material does not exist"))?;
        target.set_param(param, ParamValue::Texture(texture));

        let slot = AssetSlot::MaterialParam {
            material,
            param: param.to_string(),
        };
        self.dependencies.remove_instance(&slot);
        self.register_slot(AssetRef::Texture(texture), slot);
        Ok(())
    }

    fn register_slot(&mut self, asset: AssetRef, slot: AssetSlot) {
        if self.dependencies.add_instance(asset, slot.clone()) {
            return;
        }
        if let Some(key) = self.scene.asset_key(asset).cloned() {
            self.dependencies.record_real(asset, &key, &self.source_root, Some(slot));
        }
    }

    #[must_use]
    pub fn report(&self) -> ConversionReport {
        ConversionReport::from_model(self)
    }
}
