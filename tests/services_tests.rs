use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;
mod test_env;

/// `extra_rc` is appended to the rc file, e.g. a `user.email` line
fn setup_test_env(extra_rc: &str) -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("deck.db");

    let config_dir = temp_dir.path().join(".taskdeck");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n{}", db_path.display(), extra_rc),
    )
    .unwrap();

    (temp_dir, guard)
}

fn deck_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taskdeck").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd
}

fn json_of(temp_dir: &TempDir, args: &[&str]) -> Value {
    let output = deck_cmd(temp_dir).args(args).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_add_list_delete_services() {
    let (temp_dir, _guard) = setup_test_env("");

    deck_cmd(&temp_dir)
        .args(["services", "add", "Docker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created service 1: Docker"));
    deck_cmd(&temp_dir)
        .args(["services", "add", "Postgres", "--color", "#10B981"])
        .assert()
        .success();

    let json = json_of(&temp_dir, &["services", "list", "--json"]);
    assert_eq!(json[0]["color"], "#3B82F6");
    assert_eq!(json[1]["color"], "#10B981");

    deck_cmd(&temp_dir)
        .args(["services", "delete", "docker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted service 1: Docker"));
    deck_cmd(&temp_dir)
        .args(["services", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Postgres"))
        .stdout(predicate::str::contains("Docker").not());
}

#[test]
fn test_service_validation() {
    let (temp_dir, _guard) = setup_test_env("");
    deck_cmd(&temp_dir).args(["services", "add", "Docker"]).assert().success();

    deck_cmd(&temp_dir)
        .args(["services", "add", "docker"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
    deck_cmd(&temp_dir)
        .args(["services", "add", "Redis", "--color", "red"])
        .assert()
        .code(1);
    deck_cmd(&temp_dir)
        .args(["services", "delete", "Dokcer"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Did you mean 'Docker'?"));
}

#[test]
fn test_users() {
    let (temp_dir, _guard) = setup_test_env("");

    deck_cmd(&temp_dir)
        .args(["users", "add", "ana@example.com", "ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created user 1: ana <ana@example.com>"));
    deck_cmd(&temp_dir)
        .args(["users", "add", "ANA@example.com", "other"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Email already exists"));
    deck_cmd(&temp_dir)
        .args(["users", "add", "not-an-email", "x"])
        .assert()
        .code(1);

    let json = json_of(&temp_dir, &["users", "list", "--json"]);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn test_configured_owner_scopes_lists() {
    let (temp_dir, _guard) = setup_test_env("user.email=ana@example.com\n");

    // The configured owner must exist before anything owner-scoped runs
    deck_cmd(&temp_dir)
        .args(["projects", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("User 'ana@example.com' not found"));

    deck_cmd(&temp_dir).args(["users", "add", "ana@example.com", "ana"]).assert().success();
    deck_cmd(&temp_dir).args(["projects", "add", "Mine"]).assert().success();
    deck_cmd(&temp_dir).args(["services", "add", "Docker"]).assert().success();

    let json = json_of(&temp_dir, &["projects", "list", "--json"]);
    assert_eq!(json["items"][0]["name"], "Mine");
    assert_eq!(json["items"][0]["owner_id"], 1);

    let json = json_of(&temp_dir, &["services", "list", "--json"]);
    assert_eq!(json[0]["owner_id"], 1);
}

fn set_owner(temp_dir: &TempDir, email: &str) {
    let rc = temp_dir.path().join(".taskdeck").join("rc");
    let db_path = temp_dir.path().join("deck.db");
    fs::write(rc, format!("data.location={}\nuser.email={}\n", db_path.display(), email)).unwrap();
}

#[test]
fn test_other_owners_records_are_unreachable() {
    let (temp_dir, _guard) = setup_test_env("");
    deck_cmd(&temp_dir).args(["users", "add", "ana@example.com", "ana"]).assert().success();
    deck_cmd(&temp_dir).args(["users", "add", "bob@example.com", "bob"]).assert().success();

    set_owner(&temp_dir, "bob@example.com");
    deck_cmd(&temp_dir).args(["projects", "add", "Theirs"]).assert().success();
    deck_cmd(&temp_dir).args(["tasks", "add", "Hidden", "--project", "Theirs"]).assert().success();
    deck_cmd(&temp_dir).args(["services", "add", "Docker"]).assert().success();

    set_owner(&temp_dir, "ana@example.com");
    let attempts: [&[&str]; 3] = [
        &["projects", "show", "Theirs"],
        &["projects", "delete", "1"],
        &["current", "set", "1"],
    ];
    for args in attempts {
        deck_cmd(&temp_dir)
            .args(args)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not found"));
    }
    deck_cmd(&temp_dir)
        .args(["tasks", "delete", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task not found"));
    deck_cmd(&temp_dir)
        .args(["services", "delete", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Service '1' not found"));

    // Still there for its owner
    set_owner(&temp_dir, "bob@example.com");
    deck_cmd(&temp_dir)
        .args(["projects", "show", "Theirs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hidden"));
}
