//! Writers for generated dependencies.

use std::path::Path;
use tracing::{info, warn};

use crate::core::{ConvertError, Result};
use crate::format::{MaterialDocument, SceneDocument};
use crate::model::{Dependency, ModelInfo};
use crate::scene::AssetRef;
use crate::utils::fs::atomic_write;

/// Produces the file for a generated dependency.
///
/// By the time a generator runs, the dependency already carries its final
/// key, and every real dependency has been copied and rekeyed.
pub trait DependencyGenerator {
    fn generate(&self, info: &mut ModelInfo, dependency: &Dependency, file: &Path) -> Result<()>;
}

fn unsupported(dependency: &Dependency) -> ConvertError {
    ConvertError::UnsupportedDependencyKind {
        key: dependency.original_key().render(),
        kind: dependency.asset().kind_label().to_string(),
    }
}

fn write_file(dependency: &Dependency, operation: &str, file: &Path, content: &str) -> Result<()> {
    atomic_write(file, content.as_bytes())
        .map_err(|e| ConvertError::io(dependency.original_key().render(), operation, file, e))
}

/// Writes a material as a material document.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialGenerator;

impl DependencyGenerator for MaterialGenerator {
    fn generate(&self, info: &mut ModelInfo, dependency: &Dependency, file: &Path) -> Result<()> {
        let AssetRef::Material(id) = dependency.asset() else {
            return Err(unsupported(dependency));
        };
        let scene = info.scene();
        let material = scene.material(id).ok_or_else(|| {
            ConvertError::invalid_argument(format!(
                "material '{}' no longer exists",
                dependency.original_key()
            ))
        })?;

        info!("Writing material: {}", file.display());
        let document = MaterialDocument::from_material(scene, material);
        write_file(dependency, "writing material", file, &document.to_toml(file)?)
    }
}

/// Writes the sub-tree below an extraction link as its own scene document.
///
/// Afterwards the sub-tree is detached, so the link only carries the key of
/// the new file and loaders resolve it from disk like any other link.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedModelGenerator;

impl DependencyGenerator for LinkedModelGenerator {
    fn generate(&self, info: &mut ModelInfo, dependency: &Dependency, file: &Path) -> Result<()> {
        let AssetRef::Link(link) = dependency.asset() else {
            return Err(unsupported(dependency));
        };

        let children = info.scene().children(link).to_vec();
        let [child] = children.as_slice() else {
            warn!(
                "Not writing linked model '{}': expected one child, found {}",
                dependency.original_key(),
                children.len()
            );
            return Ok(());
        };

        info!("Writing linked model: {}", file.display());
        let document = SceneDocument::from_subtree(info.scene(), *child)?;
        write_file(dependency, "writing linked model", file, &document.to_json(file)?)?;

        info.scene_mut().detach(*child);
        Ok(())
    }
}
