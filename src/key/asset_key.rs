use serde::{Deserialize, Serialize};
use std::fmt;

use super::ResourceKey;
use crate::core::Result;

/// Loader options carried by texture keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureOptions {
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_generate_mips")]
    pub generate_mips: bool,
    #[serde(default)]
    pub anisotropy: u32,
}

fn default_generate_mips() -> bool {
    true
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_y: false,
            generate_mips: true,
            anisotropy: 0,
        }
    }
}

/// What kind of asset a key loads, with kind-specific metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A scene document loaded as a sub-model
    Model,
    Material,
    Texture(TextureOptions),
    /// Anything else, copied as opaque bytes
    Asset,
}

impl KeyKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Material => "material",
            Self::Texture(_) => "texture",
            Self::Asset => "asset",
        }
    }
}

/// A resource location plus the kind metadata that must survive rehoming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    location: ResourceKey,
    kind: KeyKind,
}

impl AssetKey {
    #[must_use]
    pub fn new(location: ResourceKey, kind: KeyKind) -> Self {
        Self {
            location,
            kind,
        }
    }

    pub fn model(path: &str) -> Result<Self> {
        Ok(Self::new(ResourceKey::parse(path)?, KeyKind::Model))
    }

    pub fn material(path: &str) -> Result<Self> {
        Ok(Self::new(ResourceKey::parse(path)?, KeyKind::Material))
    }

    pub fn texture(path: &str, options: TextureOptions) -> Result<Self> {
        Ok(Self::new(ResourceKey::parse(path)?, KeyKind::Texture(options)))
    }

    pub fn asset(path: &str) -> Result<Self> {
        Ok(Self::new(ResourceKey::parse(path)?, KeyKind::Asset))
    }

    /// Same kind and metadata, new location.
    #[must_use]
    pub fn with_location(&self, location: ResourceKey) -> Self {
        Self {
            location,
            kind: self.kind,
        }
    }

    /// Rehome to `new_path`, keeping the kind metadata of `self`.
    pub fn rehome(&self, new_path: &str) -> Result<Self> {
        Ok(self.with_location(self.location.rehome(new_path)?))
    }

    #[must_use]
    pub fn location(&self) -> &ResourceKey {
        &self.location
    }

    #[must_use]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.location.render()
    }

    #[must_use]
    pub fn texture_options(&self) -> Option<TextureOptions> {
        match self.kind {
            KeyKind::Texture(options) => Some(options),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)?;
        if let KeyKind::Texture(options) = self.kind
            && options.flip_y
        {
            f.write_str(" (flipped)")?;
        }
        Ok(())
    }
}
