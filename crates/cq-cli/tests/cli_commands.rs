#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cq() -> Command {
    Command::cargo_bin("cq").unwrap()
}

/// Run `cq` with `args` against `dir` and require success.
fn run_in(dir: &Path, args: &[&str]) {
    cq().args(args).arg("-d").arg(dir).assert().success();
}

/// Hello → Menu; Menu offers "New Choice" → Ale and "Leave" (unlinked).
fn inn() -> TempDir {
    let dir = TempDir::new().unwrap();
    let d = dir.path();
    run_in(d, &["new", "Inn"]);
    run_in(d, &["add-node", "Inn", "Hello", "--text", "Welcome, traveller."]);
    run_in(d, &["add-node", "Inn", "Menu", "--kind", "multiple", "--text", "What will it be?"]);
    run_in(d, &["add-choice", "Inn", "Menu", "--text", "Leave"]);
    run_in(d, &["add-node", "Inn", "Ale", "--text", "A frothy mug."]);
    run_in(d, &["link", "Inn", "Hello", "1", "Menu"]);
    run_in(d, &["link", "Inn", "Menu", "1", "Ale"]);
    dir
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

#[test]
fn new_creates_graph_files() {
    let dir = TempDir::new().unwrap();
    cq().args(["new", "My Inn", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created graph 'MyInn'"));

    assert!(dir.path().join("graphs/MyInn.json").exists());
    assert!(dir.path().join("dialogues/MyInn/MyInn.json").exists());
}

#[test]
fn new_refuses_existing_graph() {
    let dir = inn();
    cq().args(["new", "Inn", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ---------------------------------------------------------------------------
// editing
// ---------------------------------------------------------------------------

#[test]
fn add_node_writes_dialogue_asset() {
    let dir = inn();
    assert!(dir.path().join("dialogues/Inn/global/dialogues/Hello.json").exists());
    let asset = fs::read_to_string(dir.path().join("dialogues/Inn/global/dialogues/Menu.json")).unwrap();
    assert!(asset.contains("\"Leave\""));
}

#[test]
fn add_node_into_group() {
    let dir = inn();
    cq().args(["add-node", "Inn", "Barrel", "--group", "Cellar", "-d"])
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("dialogues/Inn/groups/Cellar/Cellar.json").exists());
    assert!(dir.path().join("dialogues/Inn/groups/Cellar/dialogues/Barrel.json").exists());

    cq().args(["list", "Inn", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cellar"));
}

#[test]
fn duplicate_name_blocks_save() {
    let dir = inn();
    cq().args(["add-node", "Inn", "Hello", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation error"));
}

#[test]
fn add_node_rejects_unknown_kind() {
    let dir = inn();
    cq().args(["add-node", "Inn", "Odd", "--kind", "branching", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown node kind"));
}

#[test]
fn add_choice_to_single_choice_node_fails() {
    let dir = inn();
    cq().args(["add-choice", "Inn", "Hello", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("single-choice"));
}

#[test]
fn link_to_unknown_node_suggests() {
    let dir = inn();
    cq().args(["link", "Inn", "Hello", "1", "Menux", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean: Menu"));
}

#[test]
fn link_out_of_range_choice_fails() {
    let dir = inn();
    cq().args(["link", "Inn", "Menu", "3", "Hello", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid choice index"));
}

#[test]
fn remove_node_unlinks_incoming() {
    let dir = inn();
    cq().args(["remove-node", "Inn", "Ale", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'Ale'"))
        .stdout(predicate::str::contains("1 choice(s) now unlinked"));

    assert!(!dir.path().join("dialogues/Inn/global/dialogues/Ale.json").exists());
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_for_valid_graph() {
    let dir = inn();
    cq().args(["check", "Inn", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stdout(predicate::str::contains("3 nodes"));
}

#[test]
fn check_fails_without_starting_node() {
    let dir = TempDir::new().unwrap();
    let d = dir.path();
    run_in(d, &["new", "Loop"]);
    run_in(d, &["add-node", "Loop", "A"]);
    run_in(d, &["link", "Loop", "A", "1", "A"]);

    cq().args(["check", "Loop", "-d"])
        .arg(d)
        .assert()
        .failure()
        .stdout(predicate::str::contains("no starting node"));
}

#[test]
fn check_missing_graph_fails() {
    let dir = TempDir::new().unwrap();
    cq().args(["check", "Nowhere", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("graph not found"));
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

#[test]
fn list_shows_nodes() {
    let dir = inn();
    cq().args(["list", "Inn", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"))
        .stdout(predicate::str::contains("Menu"))
        .stdout(predicate::str::contains("multiple"))
        .stdout(predicate::str::contains("3 nodes"));
}

#[test]
fn list_starting_only() {
    let dir = inn();
    cq().args(["list", "Inn", "--starting", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"))
        .stdout(predicate::str::contains("Ale").not())
        .stdout(predicate::str::contains("1 nodes"));
}

#[test]
fn show_node_details() {
    let dir = inn();
    cq().args(["show", "Inn", "Menu", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("What will it be?"))
        .stdout(predicate::str::contains("1. New Choice -> Ale"))
        .stdout(predicate::str::contains("Leave"))
        .stdout(predicate::str::contains("Hello (choice 1)"));
}

#[test]
fn show_unknown_node_fails() {
    let dir = inn();
    cq().args(["show", "Inn", "Stable", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("node not found"));
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_json_container() {
    let dir = inn();
    cq().args(["export", "Inn", "json", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ungroupedDialogues\""))
        .stdout(predicate::str::contains("\"isStartingDialogue\": true"));
}

#[test]
fn export_markdown_to_file() {
    let dir = inn();
    let out = dir.path().join("inn.md");
    cq().args(["export", "Inn", "markdown", "-o"])
        .arg(&out)
        .arg("-d")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let md = fs::read_to_string(&out).unwrap();
    assert!(md.starts_with("# Inn"));
    assert!(md.contains("### Hello (start)"));
    assert!(md.contains("- Leave → end"));
}

#[test]
fn export_unsupported_format() {
    let dir = inn();
    cq().args(["export", "Inn", "pdf", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported format"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_scripted_to_end() {
    let dir = inn();
    cq().args(["play", "Inn", "--choices", "1", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, traveller."))
        .stdout(predicate::str::contains("2. Leave"))
        .stdout(predicate::str::contains("A frothy mug."))
        .stdout(predicate::str::contains("(end)"));
}

#[test]
fn play_unlinked_choice_ends() {
    let dir = inn();
    cq().args(["play", "Inn", "--choices", "2", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(end)"))
        .stdout(predicate::str::contains("A frothy mug.").not());
}

#[test]
fn play_invalid_choice_reprompts() {
    let dir = inn();
    cq().args(["play", "Inn", "--choices", "5,1", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pick a choice between 1 and 2."))
        .stdout(predicate::str::contains("A frothy mug."));
}

#[test]
fn play_back_revisits() {
    let dir = inn();
    cq().args(["play", "Inn", "--choices", "b,1", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, traveller.").count(2))
        .stdout(predicate::str::contains("(end)"));
}

#[test]
fn play_from_named_node() {
    let dir = inn();
    cq().args(["play", "Inn", "--node", "Ale", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, traveller.").not())
        .stdout(predicate::str::contains("A frothy mug."))
        .stdout(predicate::str::contains("(end)"));
}

#[test]
fn play_reads_stdin() {
    let dir = inn();
    cq().args(["play", "Inn", "-d"])
        .arg(dir.path())
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("A frothy mug."));
}

#[test]
fn play_without_start_fails() {
    let dir = TempDir::new().unwrap();
    let d = dir.path();
    run_in(d, &["new", "Loop"]);
    run_in(d, &["add-node", "Loop", "A"]);
    run_in(d, &["link", "Loop", "A", "1", "A"]);

    cq().args(["play", "Loop", "-d"])
        .arg(d)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no starting node"));
}

// ---------------------------------------------------------------------------
// trigger
// ---------------------------------------------------------------------------

fn write_trigger_files(dir: &Path) {
    fs::write(
        dir.join("vars.json"),
        r#"{"boolNames": ["met"], "intNames": ["gold"]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("trigger.json"),
        r#"{
    "type": "conditional",
    "conditions": [{"type": "bool", "key": "met", "comparison": "is", "value": true}],
    "onTrue": {"type": "single", "graph": "Inn", "node": "Menu"},
    "onFalse": {"type": "single", "graph": "Inn"}
}"#,
    )
    .unwrap();
    fs::write(
        dir.join("mods.json"),
        r#"[{"type": "bool", "key": "met", "operation": "set", "value": true},
   {"type": "int", "key": "gold", "operation": "add", "value": 7}]"#,
    )
    .unwrap();
}

#[test]
fn trigger_false_branch() {
    let dir = inn();
    write_trigger_files(dir.path());
    cq().arg("trigger")
        .arg(dir.path().join("trigger.json"))
        .arg("--vars")
        .arg(dir.path().join("vars.json"))
        .arg("-d")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Start:"))
        .stdout(predicate::str::contains("Welcome, traveller."));
}

#[test]
fn trigger_true_branch_after_modifiers() {
    let dir = inn();
    write_trigger_files(dir.path());
    cq().arg("trigger")
        .arg(dir.path().join("trigger.json"))
        .arg("--vars")
        .arg(dir.path().join("vars.json"))
        .arg("--apply")
        .arg(dir.path().join("mods.json"))
        .arg("-d")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2/2 modifiers"))
        .stdout(predicate::str::contains("Inn/Menu"))
        .stdout(predicate::str::contains("What will it be?"));
}

#[test]
fn trigger_without_manifest_takes_false_branch() {
    let dir = inn();
    write_trigger_files(dir.path());
    cq().arg("trigger")
        .arg(dir.path().join("trigger.json"))
        .arg("-d")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, traveller."));
}
