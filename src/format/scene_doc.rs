//! Scene documents (`.scn`, JSON).
//!
//! A document holds one node tree plus a material table. Geometry nodes refer
//! to materials by index so a material shared by several geometries is still
//! a single instance after loading. Materials carrying a key are stored as a
//! reference to their `.mat` file; the rest are stored inline.
//!
//! Link nodes store only their key. Whatever is attached below a link in
//! memory is never written into the linking document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::AssetResolver;
use super::material_doc::MaterialDocument;
use crate::core::{ConvertError, Result};
use crate::key::{AssetKey, KeyKind, ResourceKey};
use crate::scene::{MaterialId, Mesh, Node, NodeId, NodeKind, Scene, Transform};

/// Current document version written by [`SceneDocument::to_json`].
pub const SCENE_DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCENE_DOCUMENT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<MaterialEntry>,
    pub root: NodeDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialEntry {
    /// Loaded from a material document at this key
    Key(ResourceKey),
    Inline(MaterialDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Transform::is_identity")]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_data: BTreeMap<String, String>,
    pub node: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeBody {
    Group {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeDocument>,
    },
    Geometry {
        #[serde(default)]
        mesh: Mesh,
        /// Index into the document's material table
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<usize>,
    },
    Link {
        key: ResourceKey,
    },
}

impl SceneDocument {
    /// Capture the sub-tree rooted at `node`.
    pub fn from_subtree(scene: &Scene, node: NodeId) -> Result<Self> {
        let mut capture = Capture {
            scene,
            materials: Vec::new(),
            indices: HashMap::new(),
        };
        let root = capture.node(node)?;
        Ok(Self {
            version: SCENE_DOCUMENT_VERSION,
            materials: capture.materials,
            root,
        })
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let document: Self = serde_json::from_str(content).map_err(|e| ConvertError::SceneParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if document.version > SCENE_DOCUMENT_VERSION {
            return Err(ConvertError::SceneParse {
                path: path.to_path_buf(),
                reason: format!(
                    "document version {} is newer than the supported version {}",
                    document.version, SCENE_DOCUMENT_VERSION
                ),
            });
        }
        Ok(document)
    }

    pub fn to_json(&self, path: &Path) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConvertError::SceneParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build a new scene from the document.
    pub fn into_scene(&self, resolver: &mut dyn AssetResolver, path: &Path) -> Result<Scene> {
        let mut scene = Scene::new("");
        let materials = self.instantiate_materials(&mut scene, resolver)?;

        let root = scene.root();
        let node = build_node(&self.root, &materials, path)?;
        if let Some(slot) = scene.node_mut(root) {
            slot.name = node.name;
            slot.transform = node.transform;
            slot.user_data = node.user_data;
            slot.kind = node.kind;
        }
        build_children(&mut scene, root, &self.root, &materials, path)?;
        Ok(scene)
    }

    /// Build the document's tree as the last child of `parent` in an existing
    /// scene. Returns the new sub-tree root.
    pub fn graft(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        resolver: &mut dyn AssetResolver,
        path: &Path,
    ) -> Result<NodeId> {
        let materials = self.instantiate_materials(scene, resolver)?;
        let node = build_node(&self.root, &materials, path)?;
        let id = scene.add_child(parent, node)?;
        build_children(scene, id, &self.root, &materials, path)?;
        Ok(id)
    }

    fn instantiate_materials(
        &self,
        scene: &mut Scene,
        resolver: &mut dyn AssetResolver,
    ) -> Result<Vec<MaterialId>> {
        self.materials
            .iter()
            .map(|entry| match entry {
                MaterialEntry::Key(key) => resolver
                    .resolve_material(scene, AssetKey::new(key.clone(), KeyKind::Material)),
                MaterialEntry::Inline(doc) => doc.instantiate(scene, resolver, None),
            })
            .collect()
    }
}

struct Capture<'a> {
    scene: &'a Scene,
    materials: Vec<MaterialEntry>,
    indices: HashMap<MaterialId, usize>,
}

impl Capture<'_> {
    fn node(&mut self, id: NodeId) -> Result<NodeDocument> {
        let scene = self.scene;
        let node = scene
            .node(id)
            .ok_or_else(|| ConvertError::invalid_argument("node does not exist"))?;

        let body = match &node.kind {
            NodeKind::Group => NodeBody::Group {
                children: node
                    .children()
                    .iter()
                    .map(|child| self.node(*child))
                    .collect::<Result<_>>()?,
            },
            NodeKind::Geometry(geometry) => NodeBody::Geometry {
                mesh: geometry.mesh.clone(),
                material: geometry.material.map(|m| self.material(m)).transpose()?,
            },
            NodeKind::Link(link) => NodeBody::Link {
                key: link.key.location().clone(),
            },
        };

        Ok(NodeDocument {
            name: node.name.clone(),
            transform: node.transform,
            user_data: node.user_data.clone(),
            node: body,
        })
    }

    fn material(&mut self, id: MaterialId) -> Result<usize> {
        if let Some(index) = self.indices.get(&id) {
            return Ok(*index);
        }
        let scene = self.scene;
        let material = scene
            .material(id)
            .ok_or_else(|| ConvertError::invalid_argument("material does not exist"))?;
        let entry = match &material.key {
            Some(key) => MaterialEntry::Key(key.location().clone()),
            None => MaterialEntry::Inline(MaterialDocument::from_material(scene, material)),
        };
        let index = self.materials.len();
        self.materials.push(entry);
        self.indices.insert(id, index);
        Ok(index)
    }
}

fn build_node(doc: &NodeDocument, materials: &[MaterialId], path: &Path) -> Result<Node> {
    let mut node = match &doc.node {
        NodeBody::Group {
            ..
        } => Node::group(String::new()),
        NodeBody::Geometry {
            mesh,
            material,
        } => {
            let material = match material {
                Some(index) => Some(*materials.get(*index).ok_or_else(|| {
                    ConvertError::SceneParse {
                        path: path.to_path_buf(),
                        reason: format!(
                            "material index {index} out of range ({} materials)",
                            materials.len()
                        ),
                    }
                })?),
                None => None,
            };
            Node::geometry(String::new(), mesh.clone(), material)
        }
        NodeBody::Link {
            key,
        } => Node::link(AssetKey::new(key.clone(), KeyKind::Model)),
    };
    node.name = doc.name.clone();
    node.transform = doc.transform;
    node.user_data = doc.user_data.clone();
    Ok(node)
}

fn build_children(
    scene: &mut Scene,
    parent: NodeId,
    doc: &NodeDocument,
    materials: &[MaterialId],
    path: &Path,
) -> Result<()> {
    if let NodeBody::Group {
        children,
    } = &doc.node
    {
        for child in children {
            let id = scene.add_child(parent, build_node(child, materials, path)?)?;
            build_children(scene, id, child, materials, path)?;
        }
    }
    Ok(())
}
