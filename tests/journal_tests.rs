//! Transaction journal tests

use ledger_proof::journal::Journal;
use ledger_proof::signature::generate_keys;
use ledger_proof::transaction::{submit_transaction, Transaction};

#[test]
fn test_append_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::open(dir.path().join("nested").join("tx.jsonl"));
    let keys = generate_keys();

    let signed = submit_transaction("Alice", "Bob", 10, &keys.private).unwrap();
    let unsigned = Transaction::new("Bob", "Carol", 4);
    journal.append(&signed).unwrap();
    journal.append(&unsigned).unwrap();

    let read = journal.read_all().unwrap();
    assert_eq!(read, vec![signed.clone(), unsigned]);
    assert!(read[0].verify(&keys.public).is_ok());
}

#[test]
fn test_one_json_object_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::open(dir.path().join("tx.jsonl"));
    let mut tx = Transaction::new("Alice", "Bob", 10);
    tx.signature = Some(vec![12, 34]);
    journal.append(&tx).unwrap();
    journal.append(&tx).unwrap();

    let text = std::fs::read_to_string(journal.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["signature"], "12,34");
}

#[test]
fn test_missing_journal_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::open(dir.path().join("absent.jsonl"));
    assert!(journal.read_all().unwrap().is_empty());
}

#[test]
fn test_corrupt_line_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tx.jsonl");
    std::fs::write(&path, "{not json}\n").unwrap();
    assert!(Journal::open(&path).read_all().is_err());
}
