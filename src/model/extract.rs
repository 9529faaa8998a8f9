//! Sub-tree extraction and generated materials.

use tracing::debug;

use super::ModelInfo;
use super::dependency::Dependency;
use crate::constants::{MATERIAL_EXTENSION, SCENE_EXTENSION};
use crate::core::{ConvertError, Result};
use crate::key::AssetKey;
use crate::scene::{AssetRef, AssetSlot, MaterialId, Node, NodeId, NodeKind, Transform};
use crate::utils::fs::with_extension;

impl ModelInfo {
    /// Move `node` into its own output unit.
    ///
    /// A link placeholder keyed by `asset_name` takes the node's place (same
    /// index in the parent) and its local transform; the node becomes the
    /// link's only child with an identity transform. The link is registered as
    /// a generated dependency and its id returned.
    ///
    /// Fails with [`ConvertError::InvalidArgument`] for the root or any other
    /// node without a parent.
    pub fn extract_submodel(&mut self, node: NodeId, asset_name: &str) -> Result<NodeId> {
        let asset_name = with_extension(asset_name, SCENE_EXTENSION);
        debug!("extract_submodel({node:?}, {asset_name})");

        let parent = self.scene.parent(node).ok_or_else(|| {
            ConvertError::invalid_argument(format!(
                "node {} has no parent, only children can be extracted",
                self.node_label(node)
            ))
        })?;
        let key = AssetKey::model(&asset_name)?;

        let index = self.scene.detach(node).unwrap_or_default();
        let transform = match self.scene.node_mut(node) {
            Some(n) => std::mem::replace(&mut n.transform, Transform::IDENTITY),
            None => Transform::IDENTITY,
        };

        let link = self.scene.add_node(Node::link(key.clone()).with_transform(transform));
        self.scene.insert_child(parent, index, link)?;
        self.scene.attach(link, node)?;

        self.dependencies.insert_generated(Dependency::generated(
            AssetRef::Link(link),
            key,
            vec![AssetSlot::Link(link)],
        ));
        Ok(link)
    }

    /// Write `material` out as its own material document named `asset_name`.
    ///
    /// Every geometry using the material becomes a slot of the generated
    /// dependency. A material that was loaded from a file is converted into a
    /// generated one under the new key.
    pub fn generate_material(&mut self, material: MaterialId, asset_name: &str) -> Result<()> {
        let asset_name = with_extension(asset_name, MATERIAL_EXTENSION);
        debug!("generate_material({material:?}, {asset_name})");

        if self.scene.material(material).is_none() {
            return Err(ConvertError::invalid_argument("material does not exist"));
        }

        let slots: Vec<AssetSlot> = self
            .scene
            .depth_first(self.scene.root())
            .into_iter()
            .filter(|id| {
                self.scene
                    .node(*id)
                    .is_some_and(|n| matches!(&n.kind, NodeKind::Geometry(g) if g.material == Some(material)))
            })
            .map(AssetSlot::GeometryMaterial)
            .collect();
        if slots.is_empty() {
            return Err(ConvertError::invalid_argument(format!(
                "material for '{asset_name}' is not used by any geometry"
            )));
        }

        let key = AssetKey::material(&asset_name)?;
        let asset = AssetRef::Material(material);
        self.scene.set_asset_key(asset, key.clone());
        self.dependencies.insert_generated(Dependency::generated(asset, key, slots));
        Ok(())
    }

    fn node_label(&self, node: NodeId) -> String {
        match self.scene.node(node) {
            Some(n) => format!("{}({})", n.kind_label(), n.name.as_deref().unwrap_or_default()),
            None => format!("{node:?}"),
        }
    }
}
