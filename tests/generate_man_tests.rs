use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_generate_man_pages() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("man");

    Command::cargo_bin("generate-man")
        .unwrap()
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("taskdeck.1"));

    let page = fs::read_to_string(out_dir.join("taskdeck.1")).unwrap();
    assert!(page.contains(".TH"));
    assert!(page.contains("taskdeck"));

    for sub in ["projects", "tasks", "services", "users", "current", "status"] {
        assert!(out_dir.join(format!("taskdeck-{}.1", sub)).exists(), "missing page for {}", sub);
    }
}
