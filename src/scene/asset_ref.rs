use super::{MaterialId, NodeId, Scene, TextureId};
use crate::key::AssetKey;

/// Identity of a resource instance inside a [`Scene`].
///
/// Two references are the same resource exactly when their tokens are equal,
/// which for arena ids means the same slot of the same arena. Equal keys on
/// different instances never make equal tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRef {
    Material(MaterialId),
    Texture(TextureId),
    /// A link placeholder node
    Link(NodeId),
}

/// The kind of a resource instance, without its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Material,
    Texture,
    Link,
}

impl AssetKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Texture => "texture",
            Self::Link => "linked model",
        }
    }
}

impl AssetRef {
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Material(_) => AssetKind::Material,
            Self::Texture(_) => AssetKind::Texture,
            Self::Link(_) => AssetKind::Link,
        }
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        self.kind().label()
    }
}

/// A place in the graph that references a resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    /// The material attached to a geometry node
    GeometryMaterial(NodeId),
    /// A texture held by a material parameter
    MaterialParam { material: MaterialId, param: String },
    /// The target of a link node
    Link(NodeId),
}

impl AssetSlot {
    /// The resource instance this slot currently points at.
    #[must_use]
    pub fn resolve(&self, scene: &Scene) -> Option<AssetRef> {
        match self {
            Self::GeometryMaterial(node) => {
                scene.node(*node)?.material().map(AssetRef::Material)
            }
            Self::MaterialParam {
                material,
                param,
            } => scene.material(*material)?.param(param)?.texture().map(AssetRef::Texture),
            Self::Link(node) => {
                scene.node(*node)?.link_key()?;
                Some(AssetRef::Link(*node))
            }
        }
    }

    /// The key seen through this slot.
    #[must_use]
    pub fn key<'a>(&self, scene: &'a Scene) -> Option<&'a AssetKey> {
        self.resolve(scene).and_then(|asset| scene.asset_key(asset))
    }
}
