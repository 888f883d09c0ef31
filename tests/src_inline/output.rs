use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn replaces_existing_file_without_leftovers() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(PY_SIZE_FACTORS_FILE);
    fs::write(&path, "old").expect("write file");

    write_atomic(&path, b",size_factor\ns1,1\n").expect("write");
    assert_eq!(fs::read_to_string(&path).expect("read"), ",size_factor\ns1,1\n");

    let entries: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(PY_SIZE_FACTORS_FILE)]);
}

#[test]
fn missing_parent_directory_fails() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent").join("out.csv");
    assert!(write_atomic(&path, b"x").is_err());
    assert!(!path.exists());
}
