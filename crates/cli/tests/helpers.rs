use std::path::Path;

use binary_namer::{infer_project_name, parse_address, sha256_file};
use tempfile::tempdir;

#[test]
fn infer_project_name_uses_last_path_component() {
    assert_eq!(infer_project_name(Path::new("C:/work/binary-namer")), "binary-namer");
    assert_eq!(infer_project_name(Path::new("/tmp/project-root")), "project-root");
}

#[test]
fn infer_project_name_falls_back_when_missing() {
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}

#[test]
fn parse_address_accepts_decimal_and_hex() {
    assert_eq!(parse_address("4096").expect("decimal"), 4096);
    assert_eq!(parse_address("0x1000").expect("hex"), 0x1000);
    assert_eq!(parse_address("0XdeadBEEF").expect("hex upper prefix"), 0xdead_beef);
    assert_eq!(parse_address("  0x10  ").expect("trimmed"), 0x10);
}

#[test]
fn parse_address_rejects_garbage() {
    let err = parse_address("not-an-address").expect_err("should fail");
    assert!(err.to_string().contains("Invalid address"), "unexpected error: {err}");

    let err = parse_address("0xzz").expect_err("should fail");
    assert!(err.to_string().contains("Invalid address"), "unexpected error: {err}");
}

#[test]
fn sha256_file_hashes_and_errors_with_context() {
    let dir = tempdir().expect("tempdir");

    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, b"{}").expect("write");
    let hash = sha256_file(&path).expect("hash");
    assert_eq!(hash.len(), 64);

    let missing = dir.path().join("missing.json");
    let err = sha256_file(&missing).expect_err("should fail");
    assert!(err.to_string().contains("Failed to open file for hashing"));
}
