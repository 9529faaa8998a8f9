//! In-memory scene graph.
//!
//! Nodes, materials and textures live in [`slotmap`] arenas owned by a
//! [`Scene`]; everything else refers to them by id. Sharing a material or a
//! texture between several users means sharing its id, which is what gives
//! resource instances a stable identity for dependency discovery.
//!
//! The graph is deliberately small: groups, geometry leaves with at most one
//! material, and link placeholders for sub-models stored in their own files.

mod asset_ref;
mod material;
mod mesh;
mod node;
mod transform;

pub use asset_ref::{AssetKind, AssetRef, AssetSlot};
pub use material::{MatParam, Material, ParamValue, Texture};
pub use mesh::{Aabb, Mesh};
pub use node::{AssetLink, Geometry, Node, NodeKind};
pub use transform::Transform;

use glam::Affine3A;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;

use crate::core::{ConvertError, Result};
use crate::key::AssetKey;

new_key_type! {
    pub struct NodeId;
    pub struct MaterialId;
    pub struct TextureId;
}

/// A scene graph rooted at a single group node.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    materials: SlotMap<MaterialId, Material>,
    textures: SlotMap<TextureId, Texture>,
    root: NodeId,
}

impl Scene {
    /// Create a scene with an empty root group.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::with_root(Node::group(root_name))
    }

    /// Create a scene around an existing root node. Hierarchy links on `root`
    /// are reset.
    #[must_use]
    pub fn with_root(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root);
        Self {
            nodes,
            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            root,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &Texture)> {
        self.textures.iter()
    }

    /// Add a node to the arena without attaching it anywhere.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Add `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        let id = self.add_node(node);
        if let Err(e) = self.attach(parent, id) {
            self.nodes.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Attach `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Attach `child` at `index` in `parent`'s children. The index is clamped
    /// to the child count after `child` has been detached.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        self.detach(child);

        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| ConvertError::invalid_argument("parent node does not exist"))?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
        }
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self
            .nodes
            .get(parent)
            .ok_or_else(|| ConvertError::invalid_argument("parent node does not exist"))?;
        if !self.nodes.contains_key(child) {
            return Err(ConvertError::invalid_argument("child node does not exist"));
        }
        if !parent_node.accepts_children() {
            return Err(ConvertError::invalid_argument(format!(
                "{} nodes cannot have children",
                parent_node.kind_label()
            )));
        }
        if child == self.root {
            return Err(ConvertError::invalid_argument("the root node cannot be attached"));
        }
        if self.is_ancestor(child, parent) {
            return Err(ConvertError::invalid_argument(
                "a node cannot be attached below itself",
            ));
        }
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its parents.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Detach `child` from its parent. Returns the index it occupied.
    ///
    /// The node and its sub-tree stay in the arena; they are just no longer
    /// reachable from their former parent.
    pub fn detach(&mut self, child: NodeId) -> Option<usize> {
        let parent = self.nodes.get_mut(child)?.parent.take()?;
        let siblings = &mut self.nodes.get_mut(parent)?.children;
        let index = siblings.iter().position(|id| *id == child)?;
        siblings.remove(index);
        Some(index)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or_default()
    }

    /// Pre-order depth-first walk starting at `start`.
    #[must_use]
    pub fn depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !self.nodes.contains_key(id) {
                continue;
            }
            result.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        result
    }

    /// Breadth-first walk starting at `start`, so nodes higher in the tree
    /// come first.
    #[must_use]
    pub fn breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !self.nodes.contains_key(id) {
                continue;
            }
            result.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        result
    }

    /// Local-to-world transform of `id`.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine3A {
        let mut transform = Affine3A::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get(id)) {
            transform = node.transform.to_affine() * transform;
            current = node.parent;
        }
        transform
    }

    /// World-space bounds of every mesh below `id` (inclusive).
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.depth_first(id)
            .into_iter()
            .filter_map(|node_id| match &self.nodes[node_id].kind {
                NodeKind::Geometry(geometry) => {
                    geometry.mesh.bounds(&self.world_transform(node_id))
                }
                _ => None,
            })
            .reduce(Aabb::union)
    }

    /// The key currently carried by a resource instance.
    #[must_use]
    pub fn asset_key(&self, asset: AssetRef) -> Option<&AssetKey> {
        match asset {
            AssetRef::Material(id) => self.materials.get(id)?.key.as_ref(),
            AssetRef::Texture(id) => self.textures.get(id)?.key.as_ref(),
            AssetRef::Link(id) => self.nodes.get(id)?.link_key(),
        }
    }

    /// Replace the key of a resource instance. Returns `false` when the
    /// instance no longer exists.
    pub fn set_asset_key(&mut self, asset: AssetRef, key: AssetKey) -> bool {
        match asset {
            AssetRef::Material(id) => match self.materials.get_mut(id) {
                Some(material) => {
                    material.key = Some(key);
                    true
                }
                None => false,
            },
            AssetRef::Texture(id) => match self.textures.get_mut(id) {
                Some(texture) => {
                    texture.key = Some(key);
                    true
                }
                None => false,
            },
            AssetRef::Link(id) => match self.nodes.get_mut(id).map(|n| &mut n.kind) {
                Some(NodeKind::Link(link)) => {
                    link.key = key;
                    true
                }
                _ => false,
            },
        }
    }
}
