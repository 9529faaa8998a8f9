//! Conversion report: where every dependency came from and where it went.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::ModelInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub model: String,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub kind: String,
    pub original_key: String,
    pub current_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    pub instance_count: usize,
    pub generated: bool,
}

impl ConversionReport {
    /// Snapshot the dependencies of `info`, in discovery order.
    #[must_use]
    pub fn from_model(info: &ModelInfo) -> Self {
        let scene = info.scene();
        let entries = info
            .dependencies()
            .map(|dep| {
                let original_key = dep.original_key().render();
                ReportEntry {
                    kind: dep.original_key().kind().label().to_string(),
                    current_key: dep
                        .current_key(scene)
                        .map_or_else(|| original_key.clone(), |k| k.render()),
                    original_key,
                    source_file: dep.source_file().map(PathBuf::from),
                    instance_count: dep.instances().len(),
                    generated: dep.is_generated(),
                }
            })
            .collect();

        Self {
            model: info.name().to_string(),
            entries,
        }
    }

    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.generated).count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} dependencies", self.model, self.entries.len())?;
        if self.entries.is_empty() {
            return Ok(());
        }

        let width = self.entries.iter().map(|e| e.original_key.len()).max().unwrap_or(0);
        for entry in &self.entries {
            let origin = if entry.generated { "generated" } else { "copied" };
            writeln!(
                f,
                "  {:<width$} -> {}  [{}, {}, x{}]",
                entry.original_key,
                entry.current_key,
                entry.kind,
                origin,
                entry.instance_count,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{AssetKey, TextureOptions};
    use crate::scene::{Material, Mesh, Node, ParamValue, Scene, Texture};
    use std::path::Path;

    #[test]
    fn test_report_lists_dependencies() {
        let mut scene = Scene::new("door");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(
            AssetKey::texture("textures/wood.png", TextureOptions::default()).unwrap(),
        ));
        let mut material = Material::new("Lighting");
        material.set_param("DiffuseMap", ParamValue::Texture(texture));
        let material = scene.add_material(material);
        scene.add_child(root, Node::geometry("panel", Mesh::default(), Some(material))).unwrap();

        let mut info = ModelInfo::new(Path::new("/src"), "door.scn", scene);
        info.generate_material(material, "mats/panel").unwrap();

        let report = ConversionReport::from_model(&info);
        assert_eq!(report.model, "door.scn");
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.generated_count(), 1);

        let texture = &report.entries[0];
        assert_eq!(texture.kind, "texture");
        assert_eq!(texture.source_file, Some(PathBuf::from("/src/textures/wood.png")));
        assert!(!texture.generated);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][1]["original_key"], "mats/panel.mat");
        assert!(json["entries"][1].get("source_file").is_none());

        let table = report.to_string();
        assert!(table.contains("textures/wood.png"));
        assert!(table.contains("generated"));
    }
}
