//! Concurrency tests for the lernkarten binary.
//!
//! Several processes adding and importing cards at once must never hand out
//! the same id twice or lose a write.

use assert_cmd::Command;
use std::collections::HashSet;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("config.toml"), "").expect("Failed to write config");
    temp_dir
}

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lernkarten"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

fn stored_ids(dir: &Path) -> Vec<String> {
    let contents = std::fs::read_to_string(dir.join("data/cards.json")).expect("No card store");
    let store: serde_json::Value = serde_json::from_str(&contents).expect("Invalid card store");
    store["cards"]
        .as_array()
        .expect("cards array")
        .iter()
        .map(|c| c["id"].as_str().expect("id").to_string())
        .collect()
}

#[test]
fn test_concurrent_adds_get_unique_ids() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dir = dir.clone();
            thread::spawn(move || {
                for j in 0..3 {
                    cli(&dir)
                        .args(["add", "--topic", "Zugversuch", "--type", "Formel"])
                        .arg("--title")
                        .arg(format!("card {}-{}", i, j))
                        .assert()
                        .success();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let ids = stored_ids(&dir);
    assert_eq!(ids.len(), 12, "Expected 12 cards, got {}", ids.len());

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 12, "Duplicate ids assigned: {:?}", ids);
    assert!(ids.contains(&"ZUG-F-012".to_string()));
}

#[test]
fn test_concurrent_imports_do_not_collide() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().to_path_buf();

    for i in 0..3 {
        let json = format!(
            r#"[{{"title": "Import {i} a", "topic": "Torsion", "type": "Graph"}},
               {{"title": "Import {i} b", "topic": "Torsion", "type": "Graph"}}]"#
        );
        std::fs::write(dir.join(format!("batch{}.json", i)), json).unwrap();
    }

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let dir = dir.clone();
            thread::spawn(move || {
                cli(&dir)
                    .arg("import")
                    .arg(dir.join(format!("batch{}.json", i)))
                    .assert()
                    .success();
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let ids = stored_ids(&dir);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), 6);
    assert_eq!(unique.len(), 6, "Duplicate ids assigned: {:?}", ids);
}
