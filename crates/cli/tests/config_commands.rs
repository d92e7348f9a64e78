use binary_namer::commands::{
    import_snapshot_command, init_project_command, list_runs_command, load_project_config,
    rename_all_command, set_model_command, set_server_command, undo_command,
};
use namer_core::db::{ProjectDb, ProjectLayout, RenameRunStatus};
use tempfile::tempdir;

#[test]
fn set_server_and_set_model_update_the_config() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("CfgProj".into())).expect("init");

    set_server_command(&root, "localhost", 11434).expect("set server");
    set_model_command(&root, "mistral:latest", Some(32768)).expect("set model");

    let layout = ProjectLayout::new(temp.path());
    let config = load_project_config(&layout).expect("load config");
    assert_eq!(config.oracle.host.as_deref(), Some("localhost"));
    assert_eq!(config.oracle.port, Some(11434));
    assert_eq!(config.oracle.model.as_deref(), Some("mistral:latest"));
    assert_eq!(config.oracle.num_ctx, Some(32768));
    assert!(config.oracle.is_configured());
}

#[test]
fn set_model_requires_a_server_first() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("NoServerProj".into())).expect("init");

    let err = set_model_command(&root, "mistral:latest", None).expect_err("should fail");
    assert!(err.to_string().contains("No oracle server configured"), "unexpected error: {err}");
}

#[test]
fn rename_commands_require_a_configured_oracle() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("UnconfiguredProj".into())).expect("init");

    let err = rename_all_command(&root).expect_err("should fail");
    assert!(err.to_string().contains("set-server"), "unexpected error: {err}");
}

#[test]
fn rename_all_records_per_item_failures_when_server_is_unreachable() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("OfflineProj".into())).expect("init");

    let json = r#"{
      "binary": "libdemo.so",
      "functions": [
        {
          "address": 256,
          "name": "sub_100",
          "instructions": [{"address": 256, "text": "return 0", "vars": []}]
        }
      ]
    }"#;
    let snapshot_path = temp.path().join("libdemo.json");
    std::fs::write(&snapshot_path, json).expect("write snapshot");
    import_snapshot_command(&root, snapshot_path.to_str().expect("utf8 path"), None, true)
        .expect("import");

    // Nothing listens on port 1; the connection is refused per item, the
    // batch completes, and the failure is recorded rather than aborting.
    set_server_command(&root, "127.0.0.1", 1).expect("set server");
    set_model_command(&root, "mistral:latest", None).expect("set model");

    rename_all_command(&root).expect("rename-all should complete");

    let layout = ProjectLayout::new(temp.path());
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let runs = db.list_rename_runs().expect("runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RenameRunStatus::Completed);
    assert_eq!(runs[0].renamed, 0);
    assert_eq!(runs[0].failed, 1);

    // The function keeps its auto-generated name.
    assert_eq!(db.function(256).expect("fn").expect("row").name, "sub_100");

    // A report file was written for the run.
    let reports: Vec<_> = std::fs::read_dir(&layout.reports_dir)
        .expect("reports dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(reports.len(), 1);

    list_runs_command(&root, false).expect("list runs text");
    list_runs_command(&root, true).expect("list runs json");
}

#[test]
fn undo_reports_when_there_is_nothing_to_revert() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("UndoProj".into())).expect("init");

    undo_command(&root).expect("undo on empty log");
}
