//! Integration tests for the lernkarten binary.
//!
//! These tests verify end-to-end behavior including:
//! - Card creation, editing and deletion
//! - Import with duplicate detection
//! - Review sessions and history
//! - CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory with an empty config file
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("config.toml"), "").expect("Failed to write config");
    temp_dir
}

/// CLI pointed at the test directory, isolated from the user's config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lernkarten"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

fn add(dir: &Path, topic: &str, card_type: &str, title: &str) -> assert_cmd::assert::Assert {
    cli(dir)
        .args(["add", "--topic", topic, "--type", card_type, "--title", title])
        .assert()
}

const IMPORT_JSON: &str = r#"[
    {"title": "Hookesches Gesetz", "topic": "Zugversuch", "type": "Formel",
     "latex": "\\sigma = E \\varepsilon",
     "variables": [{"symbol": "E", "name": "E-Modul", "unit": "GPa"}]},
    {"title": "Vickers", "topic": "Härteprüfung", "type": "Definition"}
]"#;

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("lernkarten"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Study cards"));
}

#[test]
fn test_add_assigns_sequential_ids() {
    let temp_dir = setup_test_dir();

    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke")
        .success()
        .stdout(predicate::str::contains("ZUG-F-001"));
    add(temp_dir.path(), "Zugversuch", "Formel", "Poisson")
        .success()
        .stdout(predicate::str::contains("ZUG-F-002"));
    add(temp_dir.path(), "Härteprüfung", "Erklärung", "Brinell")
        .success()
        .stdout(predicate::str::contains("HAR-E-001"));

    assert!(temp_dir.path().join("data/cards.json").exists());
}

#[test]
fn test_next_id_does_not_store_anything() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Torsion", "Graph", "Schubspannung").success();

    cli(temp_dir.path())
        .args(["next-id", "--topic", "Torsion", "--type", "Graph"])
        .assert()
        .success()
        .stdout("TOR-G-002\n");

    cli(temp_dir.path())
        .args(["next-id", "--topic", "Torsion", "--type", "Graph"])
        .assert()
        .success()
        .stdout("TOR-G-002\n");
}

#[test]
fn test_import_skips_duplicates_on_second_run() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("import.json");
    fs::write(&file, IMPORT_JSON).unwrap();

    cli(temp_dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 cards"))
        .stdout(predicate::str::contains("ZUG-F-001"))
        .stdout(predicate::str::contains("HAR-D-001"));

    cli(temp_dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 cards"))
        .stdout(predicate::str::contains("2 probable duplicates skipped"));
}

#[test]
fn test_import_replace_all_keeps_both_copies() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("import.json");
    fs::write(&file, IMPORT_JSON).unwrap();

    cli(temp_dir.path()).arg("import").arg(&file).assert().success();
    cli(temp_dir.path())
        .arg("import")
        .arg(&file)
        .arg("--replace-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 cards"))
        .stdout(predicate::str::contains("ZUG-F-002"));

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 of 4 cards"));
}

#[test]
fn test_import_rejects_incomplete_record() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("bad.json");
    fs::write(&file, r#"{"cards": [{"title": "A", "topic": "", "type": "Formel"}]}"#).unwrap();

    cli(temp_dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("topic"));

    assert!(!temp_dir.path().join("data/cards.json").exists());
}

#[test]
fn test_list_filters_by_type() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();
    add(temp_dir.path(), "Zugversuch", "Definition", "Streckgrenze").success();

    cli(temp_dir.path())
        .args(["list", "--type", "Definition"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ZUG-D-001"))
        .stdout(predicate::str::contains("ZUG-F-001").not())
        .stdout(predicate::str::contains("1 of 2 cards"));
}

#[test]
fn test_update_keeps_id() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();

    cli(temp_dir.path())
        .args(["update", "ZUG-F-001", "--topic", "Torsion", "--type", "Graph"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["show", "ZUG-F-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"topic\": \"Torsion\""))
        .stdout(predicate::str::contains("\"type\": \"Graph\""));
}

#[test]
fn test_update_sets_and_clears_latex() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();

    cli(temp_dir.path())
        .args([
            "update",
            "ZUG-F-001",
            "--latex",
            "\\sigma = E \\varepsilon",
            "--image-needed",
            "true",
        ])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["show", "ZUG-F-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"latex\": "))
        .stdout(predicate::str::contains("varepsilon"))
        .stdout(predicate::str::contains("\"image_needed\": true"));

    cli(temp_dir.path())
        .args(["update", "ZUG-F-001", "--latex", "", "--image-needed", "false"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["show", "ZUG-F-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latex").not())
        .stdout(predicate::str::contains("\"image_needed\": false"));
}

#[test]
fn test_add_rejects_blank_fields() {
    let temp_dir = setup_test_dir();

    add(temp_dir.path(), "Zugversuch", "Formel", "   ")
        .failure()
        .stderr(predicate::str::contains("title"));

    add(temp_dir.path(), "", "Formel", "Hooke")
        .failure()
        .stderr(predicate::str::contains("topic"));

    add(temp_dir.path(), "Zugversuch", " ", "Hooke")
        .failure()
        .stderr(predicate::str::contains("type"));

    assert!(!temp_dir.path().join("data/cards.json").exists());
}

#[test]
fn test_history_window_bounds() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["history", "--days", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));

    cli(temp_dir.path())
        .args(["history", "--days", "100000000"])
        .assert()
        .success();
}

#[test]
fn test_deleted_ids_are_never_reused() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "a").success();
    add(temp_dir.path(), "Zugversuch", "Formel", "b").success();

    cli(temp_dir.path())
        .args(["delete", "ZUG-F-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted ZUG-F-002"));

    add(temp_dir.path(), "Zugversuch", "Formel", "c")
        .success()
        .stdout(predicate::str::contains("ZUG-F-003"));
}

#[test]
fn test_missing_card_is_an_error() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["show", "ZUG-F-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ZUG-F-001"));

    cli(temp_dir.path())
        .args(["delete", "ZUG-F-001"])
        .assert()
        .failure();
}

#[test]
fn test_review_auto_know_logs_session() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();
    add(temp_dir.path(), "Torsion", "Graph", "Schub").success();

    cli(temp_dir.path())
        .args(["review", "--auto-know"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session complete"))
        .stdout(predicate::str::contains("Known: 2 of 2 (100%)"))
        .stdout(predicate::str::contains("Answers: 2"));

    let log = fs::read_to_string(temp_dir.path().join("data/reviews.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 sessions, 2 cards, average 100%"));
}

#[test]
fn test_review_requeues_missed_card() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();
    add(temp_dir.path(), "Torsion", "Graph", "Schub").success();

    cli(temp_dir.path())
        .args(["review", "--auto-again-first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Back to the end of the deck"))
        .stdout(predicate::str::contains("Known: 2 of 2 (100%)"))
        .stdout(predicate::str::contains("Answers: 3"));
}

#[test]
fn test_review_with_filter_and_no_matches() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();

    cli(temp_dir.path())
        .args(["review", "--topic", "Torsion", "--auto-know"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to review"));

    assert!(!temp_dir.path().join("data/reviews.jsonl").exists());
}

#[test]
fn test_interactive_review() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();

    // Enter flips, 'a' misses, Enter flips, 'k' knows, Enter finishes
    cli(temp_dir.path())
        .arg("review")
        .write_stdin("\na\n\nk\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Known: 1 of 1 (100%)"))
        .stdout(predicate::str::contains("Answers: 2"));
}

#[test]
fn test_interactive_review_quit_logs_nothing() {
    let temp_dir = setup_test_dir();
    add(temp_dir.path(), "Zugversuch", "Formel", "Hooke").success();

    cli(temp_dir.path())
        .arg("review")
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session abandoned"));

    assert!(!temp_dir.path().join("data/reviews.jsonl").exists());
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("import.json");
    fs::write(&file, IMPORT_JSON).unwrap();
    cli(temp_dir.path()).arg("import").arg(&file).assert().success();

    let csv_path = temp_dir.path().join("cards.csv");
    cli(temp_dir.path())
        .arg("export")
        .arg(&csv_path)
        .args(["--topic", "Zugversuch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 cards"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("id,topic,type,category"));
    assert!(csv.contains("ZUG-F-001"));
    assert!(!csv.contains("HAR-D-001"));
}

#[test]
fn test_category_aware_config() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[import]\ncategory_aware_fingerprint = true\n",
    )
    .unwrap();

    let first = temp_dir.path().join("theorie.json");
    fs::write(&first, r#"[{"title": "A", "topic": "T", "type": "Formel"}]"#).unwrap();
    let second = temp_dir.path().join("klausur.json");
    fs::write(
        &second,
        r#"[{"title": "A", "topic": "T", "type": "Formel", "category": "Klausuraufgaben"}]"#,
    )
    .unwrap();

    cli(temp_dir.path()).arg("import").arg(&first).assert().success();
    cli(temp_dir.path())
        .arg("import")
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 cards"));
}
