use super::TextureId;
use crate::key::AssetKey;

/// A material: a definition name plus an ordered list of named parameters.
///
/// A material loaded from a `.mat` file carries its key; an inline material
/// (declared inside a scene document) has none until a processor generates a
/// file for it.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub key: Option<AssetKey>,
    pub name: Option<String>,
    pub definition: String,
    params: Vec<MatParam>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatParam {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i64),
    Bool(bool),
    Vector([f32; 4]),
    /// A resource-bearing value
    Texture(TextureId),
}

impl ParamValue {
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        match self {
            Self::Texture(id) => Some(*id),
            _ => None,
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            ..Self::default()
        }
    }

    /// Set a parameter, replacing an existing one of the same name in place.
    pub fn set_param(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(param) => param.value = value,
            None => self.params.push(MatParam {
                name,
                value,
            }),
        }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn remove_param(&mut self, name: &str) -> Option<ParamValue> {
        let idx = self.params.iter().position(|p| p.name == name)?;
        Some(self.params.remove(idx).value)
    }

    #[must_use]
    pub fn params(&self) -> &[MatParam] {
        &self.params
    }
}

/// A texture reference. Pixel data never passes through the converter.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub key: Option<AssetKey>,
}

impl Texture {
    #[must_use]
    pub fn new(key: AssetKey) -> Self {
        Self {
            key: Some(key),
        }
    }
}
