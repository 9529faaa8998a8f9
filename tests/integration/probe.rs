//! Probe output through the CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use scenec_cli::test_utils::SourceTree;

#[test]
fn test_probe_prints_tree_and_dependencies() {
    let tree = SourceTree::door().unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["probe", "--options", "td", "Models/door.scn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Group(door)"))
        .stdout(predicate::str::contains("Geometry(knob)"))
        .stdout(predicate::str::contains("localTranslation"))
        .stdout(predicate::str::contains("Asset dependencies:"))
        .stdout(predicate::str::contains("(x2)"));
}

#[test]
fn test_probe_ignores_unknown_options() {
    let tree = SourceTree::door().unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["probe", "--options", "zq", "Models/door.scn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Group(handle)"))
        .stdout(predicate::str::contains("Asset dependencies:").not());
}

#[test]
fn test_convert_without_target_only_probes() {
    let tree = SourceTree::door().unwrap();

    Command::cargo_bin("scenec")
        .unwrap()
        .current_dir(tree.root())
        .args(["convert", "--source-root", ".", "Models/door.scn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted").not());
}
