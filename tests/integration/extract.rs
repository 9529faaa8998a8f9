//! Sub-model extraction and reloading what was written.

use assert_cmd::Command;
use glam::Vec3;
use scenec_cli::convert::Convert;
use scenec_cli::core::ConvertError;
use scenec_cli::reader::{AssetReader, ModelAssets};
use scenec_cli::scene::ParamValue;
use scenec_cli::test_utils::SourceTree;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn extract_handle(assets: &mut ModelAssets<'_>) -> scenec_cli::core::Result<()> {
    let info = assets.model();
    let handle = info.find_first("handle").expect("door has a handle");
    info.extract_submodel(handle, "Handle")?;
    Ok(())
}

#[test]
fn test_extracted_handle_is_written_separately() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    let mut convert = Convert::new(AssetReader::new(tree.root()).unwrap());
    convert.set_target_root(target.path());
    convert.set_target_asset_path("Models/Door");
    convert.add_processor(extract_handle);
    let info = convert.convert(&tree.path("Models/door.scn")).unwrap();

    let out = target.path().join("Models/Door");
    let main = fs::read_to_string(out.join("door.scn")).unwrap();
    assert!(!main.contains("knob"));
    let doc: Value = serde_json::from_str(&main).unwrap();
    let children = doc["root"]["node"]["group"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[1]["node"]["link"]["key"], "Models/Door/Handle.scn");

    let handle = fs::read_to_string(out.join("Handle.scn")).unwrap();
    assert!(handle.contains("knob"));
    assert!(handle.contains("Models/Door/textures/metal.png"));

    let report = info.report();
    let generated: Vec<_> = report.entries.iter().filter(|e| e.generated).collect();
    assert_eq!(generated.len(), 1);
    assert_eq!(generated[0].current_key, "Models/Door/Handle.scn");
}

#[test]
fn test_written_output_reloads_with_link_resolved() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    let mut convert = Convert::new(AssetReader::new(tree.root()).unwrap());
    convert.set_target_root(target.path());
    convert.set_target_asset_path("Models/Door");
    convert.add_processor(extract_handle);
    convert.convert(&tree.path("Models/door.scn")).unwrap();

    let reader = AssetReader::new(target.path()).unwrap();
    let mut scene = reader.load_model(&target.path().join("Models/Door/door.scn")).unwrap();
    let root = scene.root();
    let link = scene.children(root)[1];
    assert!(scene.children(link).is_empty());
    assert_eq!(scene.node(link).unwrap().transform.translation, Vec3::new(0.5, 1.0, 0.0));

    let handle = reader.resolve_link(&mut scene, link).unwrap();
    let handle_node = scene.node(handle).unwrap();
    assert_eq!(handle_node.name.as_deref(), Some("handle"));
    assert!(handle_node.transform.is_identity());

    let knob = scene.children(handle)[0];
    let material = scene.node(knob).unwrap().material().unwrap();
    let Some(ParamValue::Texture(texture)) = scene.material(material).unwrap().param("ColorMap").copied() else {
        panic!("knob material lost its texture");
    };
    let key = scene.texture(texture).unwrap().key.as_ref().unwrap();
    assert_eq!(key.render(), "Models/Door/textures/metal.png");

    // Resolving twice returns the same child
    assert_eq!(reader.resolve_link(&mut scene, link).unwrap(), handle);
}

#[test]
fn test_extracting_root_fails() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    let mut convert = Convert::new(AssetReader::new(tree.root()).unwrap());
    convert.set_target_root(target.path());
    convert.add_processor(|assets: &mut ModelAssets<'_>| {
        let info = assets.model();
        let root = info.root();
        info.extract_submodel(root, "everything").map(|_| ())
    });

    let err = convert.convert(&tree.path("Models/door.scn")).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidArgument { .. }));
    assert!(!target.path().join("door.scn").exists());
}

#[test]
fn test_cli_extract_flag() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["convert", "--source-root", "."])
        .arg("--target-root")
        .arg(target.path())
        .args(["--extract", "handle=parts/Handle", "Models/door.scn"])
        .assert()
        .success();

    assert!(target.path().join("parts/Handle.scn").is_file());
    assert!(!fs::read_to_string(target.path().join("door.scn")).unwrap().contains("knob"));
}
