use namer_core::db::{DbError, ProjectDb};
use tempfile::tempdir;

#[test]
fn open_rejects_databases_from_a_newer_schema() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("project.db");

    // Create a valid DB, then bump its schema version past what we support.
    {
        let db = ProjectDb::open(&db_path).expect("create db");
        db.connection().execute_batch("PRAGMA user_version = 99;").expect("bump version");
    }

    let err = ProjectDb::open(&db_path).expect_err("open should fail");
    match err {
        DbError::UnsupportedSchemaVersion { found, .. } => assert_eq!(found, 99),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Unsupported schema version 99"));
}

#[test]
fn rename_unknown_function_errors() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    let step = db.begin_undo_step("Rename function 0xdead").expect("begin step");
    let err = db.rename_function(step, 0xdead, "anything").expect_err("should fail");
    assert!(matches!(err, DbError::MissingFunction(0xdead)), "unexpected error: {err}");
}

#[test]
fn rename_unknown_variable_errors() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    let step = db.begin_undo_step("Rename variable").expect("begin step");
    let err = db.rename_variable(step, 0x100, 7, "anything").expect_err("should fail");
    assert!(
        matches!(err, DbError::MissingVariable { function: 0x100, var_id: 7 }),
        "unexpected error: {err}"
    );
}

#[test]
fn committing_an_empty_undo_step_discards_it() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    let step = db.begin_undo_step("Rename all functions").expect("begin step");
    assert!(!db.commit_undo_step(step).expect("commit"));
    assert!(db.list_undo_steps().expect("steps").is_empty());
}

#[test]
fn undo_on_empty_log_returns_none() {
    let dir = tempdir().expect("tempdir");
    let mut db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");
    assert!(db.undo_last().expect("undo").is_none());
}

#[test]
fn uncommitted_steps_are_not_undone() {
    let dir = tempdir().expect("tempdir");
    let mut db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    // An open (never committed) step must not be visible to undo.
    db.begin_undo_step("Rename all functions").expect("begin step");
    assert!(db.undo_last().expect("undo").is_none());
    assert!(db.list_undo_steps().expect("steps").is_empty());
}
