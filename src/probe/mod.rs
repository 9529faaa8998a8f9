//! Human-readable dump of a model: node tree, materials and dependencies.

use std::fmt::Write as _;
use tracing::{info, warn};

use crate::constants::ALL_PROBE_OPTIONS;
use crate::convert::ModelProcessor;
use crate::core::Result;
use crate::model::{Dependency, ModelInfo};
use crate::reader::ModelAssets;
use crate::scene::{AssetRef, MaterialId, NodeId, NodeKind, ParamValue, Scene};

/// What the probe prints besides the node tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    pub bounds: bool,
    pub translation: bool,
    pub rotation: bool,
    pub scale: bool,
    pub material_params: bool,
    pub user_data: bool,
    pub dependencies: bool,
}

impl ProbeOptions {
    /// Every option turned on.
    #[must_use]
    pub fn all() -> Self {
        Self::parse(ALL_PROBE_OPTIONS)
    }

    /// Parse an option string, one character per option:
    ///
    /// | char | shows |
    /// |------|-------|
    /// | `A`  | everything below |
    /// | `b`  | world bounds |
    /// | `t`  | local translation |
    /// | `r`  | local rotation |
    /// | `s`  | local scale |
    /// | `p`  | all material parameters |
    /// | `u`  | user data |
    /// | `d`  | the dependency list |
    ///
    /// Unknown characters are logged and ignored.
    #[must_use]
    pub fn parse(options: &str) -> Self {
        let mut result = Self::default();
        result.merge(options);
        result
    }

    /// Turn on the options named in `options`.
    pub fn merge(&mut self, options: &str) {
        for c in options.chars() {
            match c {
                'A' => self.merge(ALL_PROBE_OPTIONS),
                'b' => self.bounds = true,
                't' => self.translation = true,
                'r' => self.rotation = true,
                's' => self.scale = true,
                'p' => self.material_params = true,
                'u' => self.user_data = true,
                'd' => self.dependencies = true,
                other => warn!("Unknown probe option: {other}"),
            }
        }
    }
}

/// Logs the structure of every model it is applied to.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    options: ProbeOptions,
}

impl Probe {
    #[must_use]
    pub fn new(options: ProbeOptions) -> Self {
        Self {
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> ProbeOptions {
        self.options
    }

    pub fn options_mut(&mut self) -> &mut ProbeOptions {
        &mut self.options
    }

    /// The probe output for `info`, one entry per line.
    #[must_use]
    pub fn describe(&self, info: &ModelInfo) -> Vec<String> {
        let mut lines = Vec::new();
        self.node(&mut lines, "", info.root(), info);
        if self.options.dependencies {
            self.dependencies(&mut lines, "", info);
        }
        lines
    }

    fn node(&self, lines: &mut Vec<String>, indent: &str, id: NodeId, info: &ModelInfo) {
        let scene = info.scene();
        let Some(node) = scene.node(id) else {
            return;
        };

        let mut line = format!("{indent}{}({})", node.kind_label(), node.name.as_deref().unwrap_or_default());
        if let Some(key) = node.link_key() {
            let _ = write!(line, " key:{key}");
        }
        lines.push(line);
        self.attributes(lines, &format!("{indent}   -> "), id, scene);

        let child_indent = format!("{indent}  ");
        match &node.kind {
            NodeKind::Group | NodeKind::Link(_) => {
                for child in node.children() {
                    self.node(lines, &child_indent, *child, info);
                }
            }
            NodeKind::Geometry(geometry) => {
                if let Some(material) = geometry.material {
                    self.material(lines, &format!("{indent}      "), material, info);
                }
            }
        }
    }

    fn attributes(&self, lines: &mut Vec<String>, indent: &str, id: NodeId, scene: &Scene) {
        let Some(node) = scene.node(id) else {
            return;
        };
        if self.options.bounds {
            match scene.world_bounds(id) {
                Some(bounds) => lines.push(format!(
                    "{indent}worldBounds: center {} extent {}",
                    bounds.center(),
                    bounds.extent()
                )),
                None => lines.push(format!("{indent}worldBounds: none")),
            }
        }
        if self.options.translation {
            lines.push(format!("{indent}localTranslation: {}", node.transform.translation));
        }
        if self.options.rotation {
            lines.push(format!("{indent}localRotation: {}", node.transform.rotation));
        }
        if self.options.scale {
            lines.push(format!("{indent}localScale: {}", node.transform.scale));
        }
        if self.options.user_data && !node.user_data.is_empty() {
            lines.push(format!("{indent}userData:"));
            for (key, value) in &node.user_data {
                lines.push(format!("{indent}  {key} = {value}"));
            }
        }
    }

    fn material(&self, lines: &mut Vec<String>, indent: &str, id: MaterialId, info: &ModelInfo) {
        let scene = info.scene();
        let Some(material) = scene.material(id) else {
            return;
        };

        let mut line = format!("{indent}Material({})", material.name.as_deref().unwrap_or_default());
        let _ = write!(line, " def:{}", material.definition);
        if let Some(key) = &material.key {
            let _ = write!(line, "  key:{key}");
        }
        lines.push(line);
        if let Some(source) = info.dependency(AssetRef::Material(id)).and_then(Dependency::source_file) {
            lines.push(format!("{indent}  -> source:{}", source.display()));
        }

        if !self.options.material_params {
            return;
        }
        for param in material.params() {
            let value = match param.value {
                ParamValue::Float(v) => v.to_string(),
                ParamValue::Int(v) => v.to_string(),
                ParamValue::Bool(v) => v.to_string(),
                ParamValue::Vector(v) => format!("{v:?}"),
                ParamValue::Texture(t) => match scene.texture(t).and_then(|t| t.key.as_ref()) {
                    Some(key) => format!("Texture({key})"),
                    None => "Texture()".to_string(),
                },
            };
            lines.push(format!("{indent}  {} = {value}", param.name));
            if let ParamValue::Texture(t) = param.value
                && let Some(source) = info.dependency(AssetRef::Texture(t)).and_then(Dependency::source_file)
            {
                lines.push(format!("{indent}    -> source:{}", source.display()));
            }
        }
    }

    fn dependencies(&self, lines: &mut Vec<String>, indent: &str, info: &ModelInfo) {
        let mut dependencies: Vec<&Dependency> = info.dependencies().collect();
        if dependencies.is_empty() {
            return;
        }
        dependencies.sort_by_key(|d| d.original_key().render());

        lines.push(format!("{indent}Asset dependencies:"));
        for dependency in dependencies {
            let mut line = match dependency.source_file() {
                Some(source) => source.display().to_string(),
                None => dependency.original_key().to_string(),
            };
            if let Some(current) = info.current_key(dependency)
                && current.render() != dependency.original_key().render()
            {
                let _ = write!(line, " -> {current}");
            }
            if dependency.instances().len() > 1 {
                let _ = write!(line, " (x{})", dependency.instances().len());
            }
            lines.push(format!("{indent}  {line}"));
        }
    }
}

impl ModelProcessor for Probe {
    fn apply(&mut self, assets: &mut ModelAssets<'_>) -> Result<()> {
        for line in self.describe(assets.info()) {
            info!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{AssetKey, TextureOptions};
    use crate::scene::{Material, Mesh, Node, Texture, Transform};
    use glam::Vec3;

    fn sample() -> ModelInfo {
        let mut scene = Scene::new("door");
        let root = scene.root();
        let texture = scene.add_texture(Texture::new(
            AssetKey::texture("textures/wood.png", TextureOptions::default()).unwrap(),
        ));
        let mut material = Material::new("Lighting");
        material.key = Some(AssetKey::material("mats/wood.mat").unwrap());
        material.set_param("DiffuseMap", ParamValue::Texture(texture));
        let material = scene.add_material(material);

        let mut panel = Node::geometry(
            "panel",
            Mesh::new(vec![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]], vec![]),
            Some(material),
        )
        .with_transform(Transform::from_translation(Vec3::X));
        panel.user_data.insert("lod".to_string(), "0".to_string());
        scene.add_child(root, panel).unwrap();
        scene.add_child(root, Node::geometry("frame", Mesh::default(), Some(material))).unwrap();
        ModelInfo::new("/src", "door.scn", scene)
    }

    #[test]
    fn test_parse_options() {
        let options = ProbeOptions::parse("bt?d");
        assert!(options.bounds && options.translation && options.dependencies);
        assert!(!options.rotation && !options.material_params);
        assert_eq!(ProbeOptions::parse("A"), ProbeOptions::all());
        assert!(ProbeOptions::all().user_data);
    }

    #[test]
    fn test_default_output_is_tree() {
        let lines = Probe::default().describe(&sample());
        assert_eq!(lines[0], "Group(door)");
        assert_eq!(lines[1], "  Geometry(panel)");
        assert_eq!(lines[2], "        Material() def:Lighting  key:mats/wood.mat");
        assert_eq!(lines[3], "          -> source:/src/mats/wood.mat");
        assert!(!lines.iter().any(|l| l.contains("Asset dependencies")));
    }

    #[test]
    fn test_all_options() {
        let lines = Probe::new(ProbeOptions::all()).describe(&sample());
        let text = lines.join("\n");
        assert!(text.contains("worldBounds: center [2, 1, 1] extent [1, 1, 1]"));
        assert!(text.contains("localTranslation: [1, 0, 0]"));
        assert!(text.contains("lod = 0"));
        assert!(text.contains("DiffuseMap = Texture(textures/wood.png)"));
        assert!(text.contains("Asset dependencies:"));
        assert!(text.contains("  /src/mats/wood.mat (x2)"));
        assert!(text.contains("  /src/textures/wood.png"));
    }
}
