use std::fs;

use jsrunner_engine::{ensure_dir, write_atomically};
use tempfile::TempDir;

#[test]
fn creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join(".jsrunner_clipboard.txt");

    write_atomically(&target, "first").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "first");

    write_atomically(&target, "second").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "second");

    let leftovers = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn parent_that_is_a_file_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let result = write_atomically(&blocker.join("settings.ron"), "data");
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
