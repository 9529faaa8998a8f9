use std::collections::BTreeMap;

use super::{MaterialId, Mesh, NodeId, Transform};
use crate::key::AssetKey;

/// A scene node.
///
/// Hierarchy links (`parent`, `children`) are owned by the [`Scene`] and only
/// change through its attach/detach operations so both sides stay in sync.
///
/// [`Scene`]: super::Scene
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    /// Free-form string attributes attached by authoring tools or processors
    pub user_data: BTreeMap<String, String>,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Composite node; children are rendered in order
    Group,
    /// Leaf node drawing a mesh with at most one material
    Geometry(Geometry),
    /// Placeholder for a sub-model stored in its own file
    Link(AssetLink),
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub mesh: Mesh,
    pub material: Option<MaterialId>,
}

/// Link to an external scene document.
///
/// The target is loaded on demand and attached as the link's only child.
/// Right after extraction the child is the in-memory sub-tree instead.
#[derive(Debug, Clone)]
pub struct AssetLink {
    pub key: AssetKey,
}

impl Node {
    fn with_kind(name: Option<String>, kind: NodeKind) -> Self {
        Self {
            name,
            transform: Transform::IDENTITY,
            user_data: BTreeMap::new(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(Some(name.into()), NodeKind::Group)
    }

    #[must_use]
    pub fn geometry(name: impl Into<String>, mesh: Mesh, material: Option<MaterialId>) -> Self {
        Self::with_kind(
            Some(name.into()),
            NodeKind::Geometry(Geometry {
                mesh,
                material,
            }),
        )
    }

    /// A link named after the file it points at.
    #[must_use]
    pub fn link(key: AssetKey) -> Self {
        Self::with_kind(
            Some(key.location().file_name()),
            NodeKind::Link(AssetLink {
                key,
            }),
        )
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Geometry nodes are leaves; everything else may hold children.
    #[must_use]
    pub fn accepts_children(&self) -> bool {
        !matches!(self.kind, NodeKind::Geometry(_))
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            NodeKind::Group => "Group",
            NodeKind::Geometry(_) => "Geometry",
            NodeKind::Link(_) => "Link",
        }
    }

    #[must_use]
    pub fn material(&self) -> Option<MaterialId> {
        match &self.kind {
            NodeKind::Geometry(geometry) => geometry.material,
            _ => None,
        }
    }

    #[must_use]
    pub fn link_key(&self) -> Option<&AssetKey> {
        match &self.kind {
            NodeKind::Link(link) => Some(&link.key),
            _ => None,
        }
    }
}
