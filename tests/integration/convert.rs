//! Conversion of a complete source tree into a target tree.

use assert_cmd::Command;
use predicates::prelude::*;
use scenec_cli::convert::Convert;
use scenec_cli::core::ConvertError;
use scenec_cli::reader::AssetReader;
use scenec_cli::scene::AssetRef;
use scenec_cli::test_utils::{METAL_TEXTURE, SourceTree, WOOD_MATERIAL, init_test_logging};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn door_convert(tree: &SourceTree, target: &TempDir) -> Convert {
    let mut convert = Convert::new(AssetReader::new(tree.root()).unwrap());
    convert.set_target_root(target.path());
    convert.set_target_asset_path("Models/Door");
    convert
}

fn material_texture_key(doc: &Value, name: &str) -> Option<String> {
    doc["materials"].as_array()?.iter().find_map(|entry| {
        let inline = entry.get("inline")?;
        if inline["name"] != name {
            return None;
        }
        inline["params"][0]["value"]["texture"]["key"].as_str().map(str::to_string)
    })
}

#[test]
fn test_door_is_rehomed_under_target_path() {
    init_test_logging(None);
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    let info = door_convert(&tree, &target).convert(&tree.path("Models/door.scn")).unwrap();

    let out = target.path().join("Models/Door");
    assert_eq!(fs::read_to_string(out.join("mats/wood.mat")).unwrap(), WOOD_MATERIAL);
    assert_eq!(fs::read(out.join("textures/metal.png")).unwrap(), METAL_TEXTURE);
    assert!(out.join("textures/wood.png").is_file());
    assert!(out.join("door.scn").is_file());

    let doc: Value = serde_json::from_str(&fs::read_to_string(out.join("door.scn")).unwrap()).unwrap();
    let keyed: Vec<&str> = doc["materials"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.get("key").and_then(Value::as_str))
        .collect();
    assert_eq!(keyed, ["Models/Door/mats/wood.mat"]);
    assert_eq!(
        material_texture_key(&doc, "Metal").as_deref(),
        Some("Models/Door/textures/metal.png")
    );

    let report = info.report();
    assert_eq!(report.entries.len(), 3);
    assert!(report.entries.iter().all(|e| e.current_key.starts_with("Models/Door/")));
}

#[test]
fn test_shared_material_is_one_dependency() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();

    let info = door_convert(&tree, &target).convert(&tree.path("Models/door.scn")).unwrap();
    let scene = info.scene();

    let left = info.find_first("left").unwrap();
    let right = info.find_first("right").unwrap();
    let material = scene.node(left).unwrap().material().unwrap();
    assert_eq!(scene.node(right).unwrap().material(), Some(material));

    let dependency = info.dependency(AssetRef::Material(material)).unwrap();
    assert_eq!(dependency.instances().len(), 2);
    assert_eq!(dependency.original_key().render(), "mats/wood.mat");
    assert_eq!(
        scene.material(material).unwrap().key.as_ref().unwrap().render(),
        "Models/Door/mats/wood.mat"
    );

    let materials = info.dependencies().filter(|d| matches!(d.asset(), AssetRef::Material(_))).count();
    assert_eq!(materials, 1);
}

#[test]
fn test_missing_texture_aborts_before_scene_write() {
    let tree = SourceTree::door().unwrap();
    tree.remove("textures/wood.png").unwrap();
    let target = TempDir::new().unwrap();

    let err = door_convert(&tree, &target).convert(&tree.path("Models/door.scn")).unwrap_err();
    assert!(matches!(err, ConvertError::ResourceNotFound { ref key, .. } if key == "textures/wood.png"));
    assert!(!target.path().join("Models/Door/door.scn").exists());
}

#[test]
fn test_cli_convert_writes_report() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();
    let report = target.path().join("report.json");

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .arg("convert")
        .arg("--source-root")
        .arg(tree.root())
        .arg("--target-root")
        .arg(target.path())
        .args(["--target-path", "Models/Door"])
        .arg("--report")
        .arg(&report)
        .arg("Models/door.scn")
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted"))
        .stdout(predicate::str::contains("mats/wood.mat"));

    assert!(target.path().join("Models/Door/door.scn").is_file());
    let reports: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(reports[0]["model"], "door.scn");
    assert_eq!(reports[0]["entries"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_reads_settings_file() {
    let tree = SourceTree::door().unwrap();
    let target = TempDir::new().unwrap();
    let settings = format!(
        "source_root = {:?}\ntarget_root = {:?}\ntarget_path = \"Props\"\n",
        tree.root().display().to_string(),
        target.path().display().to_string(),
    );
    tree.write("scenec.toml", settings).unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["convert", "Models/door.scn"])
        .assert()
        .success();

    assert!(target.path().join("Props/door.scn").is_file());
    assert!(target.path().join("Props/mats/wood.mat").is_file());
}

#[test]
fn test_cli_missing_model_fails() {
    let tree = SourceTree::door().unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["convert", "--source-root", "."])
        .arg("Models/nope.scn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("nope.scn"));
}
