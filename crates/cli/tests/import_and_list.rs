use binary_namer::commands::{
    import_snapshot_command, init_project_command, list_functions_command, project_info_command,
    show_order_command,
};
use namer_core::db::{ProjectDb, ProjectLayout};
use tempfile::tempdir;

const SNAPSHOT_JSON: &str = r#"{
  "binary": "libdemo.so",
  "arch": "x86_64",
  "functions": [
    {
      "address": 256,
      "name": "sub_100",
      "callees": [512],
      "variables": [{"id": 0, "name": "var_0"}],
      "instructions": [
        {"address": 256, "text": "var_0 = sub_200()", "vars": [0]},
        {"address": 260, "text": "return var_0", "vars": [0]}
      ]
    },
    {
      "address": 512,
      "name": "sub_200",
      "callees": [],
      "instructions": [{"address": 512, "text": "return 7", "vars": []}]
    }
  ]
}"#;

#[test]
fn import_populates_the_database_and_listings_work() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("ImportProj".into())).expect("init");

    let snapshot_path = temp.path().join("libdemo.json");
    std::fs::write(&snapshot_path, SNAPSHOT_JSON).expect("write snapshot");

    import_snapshot_command(&root, snapshot_path.to_str().expect("utf8 path"), None, false)
        .expect("import");

    let layout = ProjectLayout::new(temp.path());
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let functions = db.list_functions().expect("functions");
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].name, "sub_100");

    let snapshot = db.latest_snapshot().expect("snapshot").expect("record");
    assert_eq!(snapshot.name, "libdemo.so");
    assert!(snapshot.hash.is_some(), "hash should be computed by default");

    // Listing commands should succeed in both output modes.
    list_functions_command(&root, false).expect("list text");
    list_functions_command(&root, true).expect("list json");
    show_order_command(&root, false).expect("order text");
    show_order_command(&root, true).expect("order json");
    project_info_command(&root).expect("info");
}

#[test]
fn import_accepts_yaml_snapshots() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("YamlProj".into())).expect("init");

    let yaml = "binary: libdemo.so\nfunctions:\n  - address: 256\n    name: sub_100\n";
    let snapshot_path = temp.path().join("libdemo.yaml");
    std::fs::write(&snapshot_path, yaml).expect("write snapshot");

    import_snapshot_command(&root, snapshot_path.to_str().expect("utf8 path"), None, true)
        .expect("import");

    let layout = ProjectLayout::new(temp.path());
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    assert_eq!(db.list_functions().expect("functions").len(), 1);
    let snapshot = db.latest_snapshot().expect("snapshot").expect("record");
    assert!(snapshot.hash.is_none(), "--skip-hash should store no hash");
}

#[test]
fn import_rejects_snapshots_with_duplicate_addresses() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("DupProj".into())).expect("init");

    let json = r#"{
      "binary": "libdemo.so",
      "functions": [
        {"address": 256, "name": "sub_100"},
        {"address": 256, "name": "sub_100_copy"}
      ]
    }"#;
    let snapshot_path = temp.path().join("dup.json");
    std::fs::write(&snapshot_path, json).expect("write snapshot");

    let err = import_snapshot_command(&root, snapshot_path.to_str().expect("utf8 path"), None, true)
        .expect_err("should fail");
    assert!(err.to_string().contains("Snapshot failed validation"), "unexpected error: {err}");
}

#[test]
fn import_rejects_undeclared_variable_references() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("BadVarProj".into())).expect("init");

    let json = r#"{
      "binary": "libdemo.so",
      "functions": [
        {
          "address": 256,
          "name": "sub_100",
          "instructions": [{"address": 256, "text": "x = 1", "vars": [9]}]
        }
      ]
    }"#;
    let snapshot_path = temp.path().join("badvar.json");
    std::fs::write(&snapshot_path, json).expect("write snapshot");

    let err = import_snapshot_command(&root, snapshot_path.to_str().expect("utf8 path"), None, true)
        .expect_err("should fail");
    assert!(err.to_string().contains("Snapshot failed validation"), "unexpected error: {err}");
}

#[test]
fn listings_error_when_config_missing() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().to_string_lossy().to_string();

    let err = list_functions_command(&root, false).expect_err("should fail");
    assert!(err.to_string().contains("Failed to read project config"), "unexpected error: {err}");

    let err = show_order_command(&root, false).expect_err("should fail");
    assert!(err.to_string().contains("Failed to read project config"), "unexpected error: {err}");
}
