use namer_core::db::ProjectLayout;
use predicates::prelude::*;
use tempfile::tempdir;

/// Running the CLI with no arguments should print help and exit non-zero.
#[test]
fn no_arguments_shows_help_and_fails() {
    assert_cmd::cargo::cargo_bin_cmd!("binary-namer").assert().failure();
}

/// `--help` should succeed.
#[test]
fn help_flag_succeeds() {
    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("renaming assistant"));
}

/// init-project without an explicit --root should use the current directory
/// as the project root and write the config file and database.
#[test]
fn init_project_uses_default_root_when_not_provided() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .current_dir(root)
        .arg("init-project")
        .arg("--name")
        .arg("TestProject")
        .assert()
        .success();

    let layout = ProjectLayout::new(root);
    assert!(
        layout.project_config_path.exists(),
        "project config should exist at {}",
        layout.project_config_path.display()
    );
    assert!(layout.db_path.exists(), "database should exist at {}", layout.db_path.display());
}

/// project-info should fail (non-zero exit) if no project config exists.
#[test]
fn project_info_fails_when_config_missing() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .arg("project-info")
        .arg("--root")
        .arg(root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read project config"));
}

/// import should fail when the snapshot file does not exist.
#[test]
fn import_fails_for_missing_file() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .arg("init-project")
        .arg("--root")
        .arg(root)
        .arg("--name")
        .arg("TestProject")
        .assert()
        .success();

    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .arg("import")
        .arg("--root")
        .arg(root)
        .arg("--file")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

/// A malformed address is rejected before the project is even opened.
#[test]
fn rename_function_rejects_bad_address() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    assert_cmd::cargo::cargo_bin_cmd!("binary-namer")
        .arg("rename-function")
        .arg("--root")
        .arg(root)
        .arg("--address")
        .arg("0xzz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid address"));
}
