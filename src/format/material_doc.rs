//! Material documents (`.mat`, TOML).
//!
//! ```toml
//! name = "Red"
//! definition = "Common/MatDefs/Light/Lighting.j3md"
//!
//! [[params]]
//! name = "Diffuse"
//! value = { vector = [1.0, 0.0, 0.0, 1.0] }
//!
//! [[params]]
//! name = "DiffuseMap"
//! value = { texture = { key = "textures/red.png", flip_y = true } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::AssetResolver;
use crate::core::{ConvertError, Result};
use crate::key::{AssetKey, KeyKind, ResourceKey, TextureOptions};
use crate::scene::{Material, MaterialId, ParamValue, Scene};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDocument {
    pub name: String,
    pub value: ValueDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDocument {
    Float(f32),
    Int(i64),
    Bool(bool),
    Vector([f32; 4]),
    Texture(TextureDocument),
}

/// A texture referenced by key. The loader options travel with the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureDocument {
    pub key: ResourceKey,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_true")]
    pub generate_mips: bool,
    #[serde(default)]
    pub anisotropy: u32,
}

fn default_true() -> bool {
    true
}

impl TextureDocument {
    fn from_key(key: &AssetKey) -> Self {
        let options = key.texture_options().unwrap_or_default();
        Self {
            key: key.location().clone(),
            flip_y: options.flip_y,
            generate_mips: options.generate_mips,
            anisotropy: options.anisotropy,
        }
    }

    fn to_key(&self) -> AssetKey {
        AssetKey::new(
            self.key.clone(),
            KeyKind::Texture(TextureOptions {
                flip_y: self.flip_y,
                generate_mips: self.generate_mips,
                anisotropy: self.anisotropy,
            }),
        )
    }
}

impl MaterialDocument {
    /// Capture a material of `scene`. Texture parameters are written by key;
    /// a texture without a key cannot be referenced and is left out.
    pub fn from_material(scene: &Scene, material: &Material) -> Self {
        let mut params = Vec::with_capacity(material.params().len());
        for param in material.params() {
            let value = match param.value {
                ParamValue::Float(v) => ValueDocument::Float(v),
                ParamValue::Int(v) => ValueDocument::Int(v),
                ParamValue::Bool(v) => ValueDocument::Bool(v),
                ParamValue::Vector(v) => ValueDocument::Vector(v),
                ParamValue::Texture(id) => {
                    match scene.texture(id).and_then(|t| t.key.as_ref()) {
                        Some(key) => ValueDocument::Texture(TextureDocument::from_key(key)),
                        None => {
                            warn!("Skipping parameter '{}': texture has no key", param.name);
                            continue;
                        }
                    }
                }
            };
            params.push(ParamDocument {
                name: param.name.clone(),
                value,
            });
        }

        Self {
            name: material.name.clone(),
            definition: material.definition.clone(),
            params,
        }
    }

    /// Add the material to `scene`, resolving textures through `resolver`.
    pub fn instantiate(
        &self,
        scene: &mut Scene,
        resolver: &mut dyn AssetResolver,
        key: Option<AssetKey>,
    ) -> Result<MaterialId> {
        let mut material = Material::new(self.definition.clone());
        material.name = self.name.clone();
        material.key = key;

        for param in &self.params {
            let value = match &param.value {
                ValueDocument::Float(v) => ParamValue::Float(*v),
                ValueDocument::Int(v) => ParamValue::Int(*v),
                ValueDocument::Bool(v) => ParamValue::Bool(*v),
                ValueDocument::Vector(v) => ParamValue::Vector(*v),
                ValueDocument::Texture(texture) => {
                    ParamValue::Texture(resolver.resolve_texture(scene, texture.to_key())?)
                }
            };
            material.set_param(param.name.clone(), value);
        }

        Ok(scene.add_material(material))
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConvertError::SceneParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn to_toml(&self, path: &Path) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConvertError::SceneParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::CachingResolver;
    use crate::scene::Texture;

    const RED: &str = r#"
name = "Red"
definition = "Lighting"

[[params]]
name = "Shininess"
value = { float = 8.0 }

[[params]]
name = "DiffuseMap"
value = { texture = { key = "textures/red.png", flip_y = true } }
"#;

    #[test]
    fn test_parse_and_instantiate() {
        let doc = MaterialDocument::parse(RED, Path::new("red.mat")).unwrap();
        assert_eq!(doc.params.len(), 2);

        let mut scene = Scene::new("root");
        let mut resolver = CachingResolver::default();
        let key = AssetKey::material("mats/red.mat").unwrap();
        let id = doc.instantiate(&mut scene, &mut resolver, Some(key.clone())).unwrap();

        let material = scene.material(id).unwrap();
        assert_eq!(material.key.as_ref(), Some(&key));
        assert_eq!(material.param("Shininess"), Some(&ParamValue::Float(8.0)));

        let texture = material.param("DiffuseMap").and_then(ParamValue::texture).unwrap();
        let texture_key = scene.texture(texture).unwrap().key.as_ref().unwrap();
        assert_eq!(texture_key.render(), "textures/red.png");
        assert!(texture_key.texture_options().unwrap().flip_y);
    }

    #[test]
    fn test_capture_uses_current_texture_key() {
        let mut scene = Scene::new("root");
        let key = AssetKey::texture("out/textures/red.png", TextureOptions::default()).unwrap();
        let texture = scene.add_texture(Texture::new(key));
        let orphan = scene.add_texture(Texture::default());

        let mut material = Material::new("Lighting");
        material.set_param("DiffuseMap", ParamValue::Texture(texture));
        material.set_param("NormalMap", ParamValue::Texture(orphan));
        material.set_param("UseAlpha", ParamValue::Bool(true));

        let doc = MaterialDocument::from_material(&scene, &material);
        assert_eq!(doc.params.len(), 2);
        let toml = doc.to_toml(Path::new("red.mat")).unwrap();
        assert!(toml.contains("out/textures/red.png"));
        assert!(!toml.contains("NormalMap"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = MaterialDocument::parse("definition = ", Path::new("broken.mat")).unwrap_err();
        assert!(matches!(err, ConvertError::SceneParse { .. }));
        assert!(err.to_string().contains("broken.mat"));
    }
}
