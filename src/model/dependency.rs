//! Dependency discovery.
//!
//! A [`Dependency`] stands for one resource instance. Every place in the graph
//! that references the instance is one of its slots. Two references are merged
//! only when they point at the same instance; equal keys on distinct instances
//! stay separate dependencies.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::{ConvertError, Result};
use crate::key::AssetKey;
use crate::scene::{AssetRef, AssetSlot, MaterialId, NodeId, NodeKind, ParamValue, Scene};

/// An external resource the scene depends on.
#[derive(Debug, Clone)]
pub struct Dependency {
    asset: AssetRef,
    original_key: AssetKey,
    source_file: Option<PathBuf>,
    instances: Vec<AssetSlot>,
    pinned: bool,
}

impl Dependency {
    /// A resource backed by a file below `source_root`.
    #[must_use]
    pub fn real(asset: AssetRef, key: AssetKey, source_root: &Path) -> Self {
        let source_file = source_root.join(key.render());
        Self {
            asset,
            original_key: key,
            source_file: Some(source_file),
            instances: Vec::new(),
            pinned: false,
        }
    }

    /// A resource produced during conversion. It has no source file.
    #[must_use]
    pub fn generated(asset: AssetRef, key: AssetKey, instances: Vec<AssetSlot>) -> Self {
        Self {
            asset,
            original_key: key,
            source_file: None,
            instances,
            pinned: false,
        }
    }

    #[must_use]
    pub fn asset(&self) -> AssetRef {
        self.asset
    }

    /// The key the resource had when it was discovered or registered.
    #[must_use]
    pub fn original_key(&self) -> &AssetKey {
        &self.original_key
    }

    #[must_use]
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.source_file.is_none()
    }

    /// Whether the dependency stays in the graph without any slot. Set for
    /// resources a processor loaded explicitly.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Every graph location referencing the resource, in discovery order.
    #[must_use]
    pub fn instances(&self) -> &[AssetSlot] {
        &self.instances
    }

    /// The key the resource carries now. Every slot sees this same key because
    /// it is stored once, on the resource.
    #[must_use]
    pub fn current_key<'a>(&self, scene: &'a Scene) -> Option<&'a AssetKey> {
        scene.asset_key(self.asset)
    }

    /// Replace the key of the resource, and so of every slot.
    pub fn set_key(&self, scene: &mut Scene, key: AssetKey) -> Result<()> {
        if scene.set_asset_key(self.asset, key) {
            Ok(())
        } else {
            Err(ConvertError::invalid_argument(format!(
                "{} '{}' no longer exists",
                self.asset.kind_label(),
                self.original_key
            )))
        }
    }

    fn add_instance(&mut self, slot: AssetSlot) {
        if !self.instances.contains(&slot) {
            self.instances.push(slot);
        }
    }
}

/// Resource instance to [`Dependency`] map, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    entries: Vec<Dependency>,
    index: HashMap<AssetRef, usize>,
}

impl DependencyGraph {
    /// Walk `scene` from its root and collect every keyed material and texture.
    ///
    /// The walk is depth-first in child order. Groups and links recurse into
    /// their children, geometry contributes its material and a material
    /// contributes its key plus every keyed texture parameter. A material
    /// shared by several geometries gets one slot per geometry, but its
    /// parameters are visited once. Resources without a key are skipped.
    #[must_use]
    pub fn discover(scene: &Scene, source_root: &Path) -> Self {
        let mut discovery = Discovery {
            scene,
            source_root,
            graph: Self::default(),
            visited_materials: HashSet::new(),
        };
        discovery.visit(scene.root());
        debug!("Discovered {} dependencies", discovery.graph.len());
        discovery.graph
    }

    #[must_use]
    pub fn get(&self, asset: AssetRef) -> Option<&Dependency> {
        self.index.get(&asset).map(|i| &self.entries[*i])
    }

    #[must_use]
    pub fn contains(&self, asset: AssetRef) -> bool {
        self.index.contains_key(&asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `slot` as a reference to a file-backed resource, creating the
    /// dependency on first sight.
    pub fn record_real(
        &mut self,
        asset: AssetRef,
        key: &AssetKey,
        source_root: &Path,
        slot: Option<AssetSlot>,
    ) -> &Dependency {
        let index = match self.index.get(&asset) {
            Some(index) => *index,
            None => {
                debug!("New {} dependency: {}", asset.kind_label(), key);
                self.push(Dependency::real(asset, key.clone(), source_root))
            }
        };
        if let Some(slot) = slot {
            self.entries[index].add_instance(slot);
        }
        &self.entries[index]
    }

    /// Register a generated dependency, replacing any previous entry for the
    /// same instance. The replaced entry keeps its position.
    pub fn insert_generated(&mut self, dependency: Dependency) -> &Dependency {
        let index = match self.index.get(&dependency.asset) {
            Some(index) => {
                self.entries[*index] = dependency;
                *index
            }
            None => self.push(dependency),
        };
        &self.entries[index]
    }

    /// Add a slot to an existing dependency. Returns `false` if the instance
    /// is not a dependency.
    pub fn add_instance(&mut self, asset: AssetRef, slot: AssetSlot) -> bool {
        match self.index.get(&asset) {
            Some(index) => {
                self.entries[*index].add_instance(slot);
                true
            }
            None => false,
        }
    }

    /// Keep the dependency alive without slots. Returns `false` if the
    /// instance is not a dependency.
    pub fn pin(&mut self, asset: AssetRef) -> bool {
        match self.index.get(&asset) {
            Some(index) => {
                self.entries[*index].pinned = true;
                true
            }
            None => false,
        }
    }

    /// Forget `slot` wherever it is recorded.
    pub fn remove_instance(&mut self, slot: &AssetSlot) {
        self.retain_instances(|s| s != slot);
    }

    /// Keep only the slots accepted by `keep`. Dependencies left without a
    /// slot are dropped unless pinned.
    pub fn retain_instances(&mut self, mut keep: impl FnMut(&AssetSlot) -> bool) {
        for entry in &mut self.entries {
            entry.instances.retain(|s| keep(s));
        }

        let before = self.entries.len();
        self.entries.retain(|entry| {
            let orphaned = entry.instances.is_empty() && !entry.pinned;
            if orphaned {
                debug!("Dropping unreferenced dependency: {}", entry.original_key);
            }
            !orphaned
        });
        if self.entries.len() != before {
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| (entry.asset, i))
                .collect();
        }
    }

    fn push(&mut self, dependency: Dependency) -> usize {
        let index = self.entries.len();
        self.index.insert(dependency.asset, index);
        self.entries.push(dependency);
        index
    }
}

impl<'a> IntoIterator for &'a DependencyGraph {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

struct Discovery<'a> {
    scene: &'a Scene,
    source_root: &'a Path,
    graph: DependencyGraph,
    visited_materials: HashSet<MaterialId>,
}

impl Discovery<'_> {
    fn visit(&mut self, id: NodeId) {
        let scene = self.scene;
        let Some(node) = scene.node(id) else {
            return;
        };
        debug!("Visiting {}({})", node.kind_label(), node.name.as_deref().unwrap_or_default());

        match &node.kind {
            NodeKind::Group | NodeKind::Link(_) => {
                for child in node.children() {
                    self.visit(*child);
                }
            }
            NodeKind::Geometry(geometry) => {
                if let Some(material) = geometry.material {
                    self.visit_material(id, material);
                }
            }
        }
    }

    fn visit_material(&mut self, geometry: NodeId, id: MaterialId) {
        let scene = self.scene;
        let Some(material) = scene.material(id) else {
            return;
        };

        if let Some(key) = &material.key {
            self.graph.record_real(
                AssetRef::Material(id),
                key,
                self.source_root,
                Some(AssetSlot::GeometryMaterial(geometry)),
            );
        }

        if !self.visited_materials.insert(id) {
            return;
        }

        for param in material.params() {
            let ParamValue::Texture(texture) = param.value else {
                continue;
            };
            if let Some(key) = scene.texture(texture).and_then(|t| t.key.as_ref()) {
                self.graph.record_real(
                    AssetRef::Texture(texture),
                    key,
                    self.source_root,
                    Some(AssetSlot::MaterialParam {
                        material: id,
                        param: param.name.clone(),
                    }),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TextureOptions;
    use crate::scene::{Material, Mesh, Node, Texture, TextureId};

    fn texture_key(path: &str) -> AssetKey {
        AssetKey::texture(path, TextureOptions::default()).unwrap()
    }

    #[test]
    fn test_shared_texture_is_one_dependency() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(texture_key("textures/a.png")));

        let mut m1 = Material::new("Lighting");
        m1.set_param("DiffuseMap", ParamValue::Texture(texture));
        let m1 = scene.add_material(m1);
        let mut m2 = Material::new("Lighting");
        m2.set_param("NormalMap", ParamValue::Texture(texture));
        let m2 = scene.add_material(m2);

        scene.add_child(root, Node::geometry("g1", Mesh::default(), Some(m1))).unwrap();
        scene.add_child(root, Node::geometry("g2", Mesh::default(), Some(m2))).unwrap();

        let graph = DependencyGraph::discover(&scene, Path::new("/src"));
        assert_eq!(graph.len(), 1);
        let dep = graph.get(AssetRef::Texture(texture)).unwrap();
        assert_eq!(dep.instances().len(), 2);
        assert_eq!(dep.source_file(), Some(Path::new("/src/textures/a.png")));
        assert!(!dep.is_generated());
    }

    #[test]
    fn test_equal_keys_on_distinct_instances_stay_separate() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let t1 = scene.add_texture(Texture::new(texture_key("textures/a.png")));
        let t2 = scene.add_texture(Texture::new(texture_key("textures/a.png")));

        for (name, texture) in [("g1", t1), ("g2", t2)] {
            let mut material = Material::new("Unshaded");
            material.set_param("ColorMap", ParamValue::Texture(texture));
            let material = scene.add_material(material);
            scene.add_child(root, Node::geometry(name, Mesh::default(), Some(material))).unwrap();
        }

        let graph = DependencyGraph::discover(&scene, Path::new("/src"));
        assert_eq!(graph.len(), 2);
        assert!(graph.iter().all(|d| d.instances().len() == 1));
    }

    #[test]
    fn test_shared_material_visits_params_once() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(texture_key("textures/a.png")));
        let mut material = Material::new("Lighting");
        material.key = Some(AssetKey::material("mats/shared.mat").unwrap());
        material.set_param("DiffuseMap", ParamValue::Texture(texture));
        let material = scene.add_material(material);

        let g1 = scene.add_child(root, Node::geometry("g1", Mesh::default(), Some(material))).unwrap();
        let g2 = scene.add_child(root, Node::geometry("g2", Mesh::default(), Some(material))).unwrap();

        let graph = DependencyGraph::discover(&scene, Path::new("/src"));
        let keys: Vec<String> = graph.iter().map(|d| d.original_key().render()).collect();
        assert_eq!(keys, vec!["mats/shared.mat", "textures/a.png"]);

        let material_dep = graph.get(AssetRef::Material(material)).unwrap();
        assert_eq!(
            material_dep.instances(),
            &[AssetSlot::GeometryMaterial(g1), AssetSlot::GeometryMaterial(g2)]
        );
        assert_eq!(graph.get(AssetRef::Texture(texture)).unwrap().instances().len(), 1);
    }

    #[test]
    fn test_keyless_resources_are_skipped() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let texture = scene.add_texture(Texture::default());
        let mut material = Material::new("Unshaded");
        material.set_param("ColorMap", ParamValue::Texture(texture));
        let material = scene.add_material(material);
        scene.add_child(root, Node::geometry("g", Mesh::default(), Some(material))).unwrap();
        scene.add_child(root, Node::geometry("bare", Mesh::default(), None)).unwrap();

        assert!(DependencyGraph::discover(&scene, Path::new("/src")).is_empty());
    }

    #[test]
    fn test_set_key_reaches_every_slot() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(texture_key("textures/a.png")));
        for name in ["g1", "g2"] {
            let mut material = Material::new("Unshaded");
            material.set_param("ColorMap", ParamValue::Texture(texture));
            let material = scene.add_material(material);
            scene.add_child(root, Node::geometry(name, Mesh::default(), Some(material))).unwrap();
        }

        let graph = DependencyGraph::discover(&scene, Path::new("/src"));
        let dep = graph.get(AssetRef::Texture(texture)).unwrap().clone();
        let rehomed = dep.original_key().rehome("out/textures/a.png").unwrap();
        dep.set_key(&mut scene, rehomed.clone()).unwrap();

        for slot in dep.instances() {
            assert_eq!(slot.key(&scene), Some(&rehomed));
        }
        assert_eq!(dep.current_key(&scene), Some(&rehomed));
        assert_eq!(dep.original_key().render(), "textures/a.png");
    }

    fn shared_texture_scene() -> (Scene, TextureId, Vec<MaterialId>) {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(texture_key("textures/a.png")));
        let mut materials = Vec::new();
        for name in ["g1", "g2"] {
            let mut material = Material::new("Unshaded");
            material.set_param("ColorMap", ParamValue::Texture(texture));
            let material = scene.add_material(material);
            scene.add_child(root, Node::geometry(name, Mesh::default(), Some(material))).unwrap();
            materials.push(material);
        }
        (scene, texture, materials)
    }

    #[test]
    fn test_removing_last_slot_drops_dependency() {
        let (scene, texture, materials) = shared_texture_scene();
        let mut graph = DependencyGraph::discover(&scene, Path::new("/src"));

        graph.remove_instance(&AssetSlot::MaterialParam {
            material: materials[0],
            param: "ColorMap".to_string(),
        });
        assert_eq!(graph.get(AssetRef::Texture(texture)).unwrap().instances().len(), 1);

        graph.remove_instance(&AssetSlot::MaterialParam {
            material: materials[1],
            param: "ColorMap".to_string(),
        });
        assert!(!graph.contains(AssetRef::Texture(texture)));
        assert!(graph.is_empty());
        assert!(graph.iter().all(|d| !d.instances().is_empty()));
    }

    #[test]
    fn test_pinned_dependency_survives_without_slots() {
        let (mut scene, _, _) = shared_texture_scene();
        let extra = scene.add_texture(Texture::new(texture_key("textures/extra.png")));
        let mut graph = DependencyGraph::discover(&scene, Path::new("/src"));
        let key = texture_key("textures/extra.png");
        graph.record_real(AssetRef::Texture(extra), &key, Path::new("/src"), None);
        assert!(graph.pin(AssetRef::Texture(extra)));

        graph.retain_instances(|_| false);
        assert_eq!(graph.len(), 1);
        let dep = graph.get(AssetRef::Texture(extra)).unwrap();
        assert!(dep.is_pinned());
        assert!(dep.instances().is_empty());
    }
}
