//! CLI integration tests
//!
//! These tests drive the built `rowgraph` binary against store files
//! prepared through the library.

use rowgraph_core::{Model, Record, Value};
use rowgraph_store::Store;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sender(nickname: &str) -> Record {
    Record::new("senders").field("nickname", nickname)
}

fn setup_store(temp_dir: &TempDir) -> PathBuf {
    let db_path = temp_dir.path().join("store.db");
    let store = Store::open(&db_path).unwrap();

    let event_template = Record::new("events")
        .field("raw", "")
        .field("sender", sender(""))
        .field("crowd", Value::List(vec![]));
    store
        .auto_migrate(&[&sender(""), &event_template])
        .unwrap();

    let mut event = Record::new("events")
        .field("raw", "hello")
        .field("sender", sender("kai"))
        .field("crowd", Value::List(vec![Value::Model(sender("ana"))]));
    store.save(&mut event).unwrap();
    assert_eq!(Model::id(&event), Some(1));

    store.close().unwrap();
    db_path
}

fn run(db_path: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_rowgraph");
    Command::new(cli_bin)
        .args(args)
        .args(["--db", db_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_cli_tables_lists_row_counts() {
    // Given: A store with an event and its two nested senders
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_store(&temp_dir);

    // When: `rowgraph tables`
    let output = run(&db_path, &["tables"]);

    // Then: Both tables are listed with their row counts
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("events\t1 rows"), "stdout: {}", stdout);
    assert!(stdout.contains("senders\t2 rows"), "stdout: {}", stdout);
}

#[test]
fn test_cli_dump_prints_decoded_graph() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_store(&temp_dir);

    let output = run(&db_path, &["dump", "events"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().expect("Should print one row");
    let row: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(row["raw"], "hello");
    assert_eq!(row["sender"]["nickname"], "kai");
    assert_eq!(row["crowd"][0]["nickname"], "ana");
}

#[test]
fn test_cli_dump_with_condition() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_store(&temp_dir);

    let output = run(&db_path, &["dump", "senders", "--where", "nickname = 'ana'"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"ana\""));
}

#[test]
fn test_cli_check_reports_dangling_references() {
    // Given: A store whose nested sender row was deleted
    let temp_dir = TempDir::new().unwrap();
    let db_path = setup_store(&temp_dir);

    let clean = run(&db_path, &["check"]);
    assert!(clean.status.success(), "stderr: {}", String::from_utf8_lossy(&clean.stderr));

    {
        let store = Store::open(&db_path).unwrap();
        store
            .delete(&sender(""), "nickname = ?1", ["kai"], false)
            .unwrap();
        store.close().unwrap();
    }

    // When: `rowgraph check events`
    let output = run(&db_path, &["check", "events"]);

    // Then: The command fails and names the broken token
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FOREIGN_KEY_sender"), "stdout: {}", stdout);
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 dangling reference"));
}

#[test]
fn test_cli_missing_store_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.db");

    let output = run(&missing, &["tables"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("store not found"));
    assert!(!missing.exists());
}
