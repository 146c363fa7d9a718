mod common;

use std::sync::Arc;
use std::thread;
use common::{accessions, artifact};
use mhs_collections::{Database, ErrorKind};

#[test]
fn duplicate_add_is_rejected_without_changes() {
    let db = Database::new();
    db.add(artifact("A-1", "Original title")).unwrap();
    db.add(artifact("A-2", "Other")).unwrap();

    let err = db.add(artifact("A-1", "Replacement title")).unwrap_err();
    assert!(err.is_duplicate());
    assert!(err.context.contains("A-1"));
    assert_eq!(db.size(), 2);
    assert_eq!(db.get("A-1").unwrap().title, "Original title");
}

#[test]
fn empty_accession_number_is_rejected() {
    let db = Database::new();
    assert_eq!(db.add(artifact("", "Nameless")).unwrap_err().kind, ErrorKind::InvalidArgument);
    assert_eq!(db.add_or_overwrite(artifact("  ", "Nameless")).unwrap_err().kind, ErrorKind::InvalidArgument);
    assert!(db.is_empty());
}

#[test]
fn overwrite_replaces_in_place() {
    let db = Database::new();
    db.add(artifact("A-1", "Old")).unwrap();
    db.add(artifact("A-2", "Other")).unwrap();

    let replacement = artifact("A-1", "New").with_donor("Estate of M. Pereira");
    assert!(db.add_or_overwrite(replacement.clone()).unwrap());
    assert_eq!(db.size(), 2);

    let matching: Vec<_> = db.snapshot().into_iter().filter(|a| a.accession_number == "A-1").collect();
    assert_eq!(matching, vec![replacement]);

    assert!(!db.add_or_overwrite(artifact("A-3", "Third")).unwrap());
    assert_eq!(db.size(), 3);
}

#[test]
fn remove_missing_is_a_no_op() {
    let db = Database::new();
    db.add(artifact("A-1", "Kept")).unwrap();

    assert!(!db.remove(&artifact("Z-9", "Missing")));
    assert_eq!(db.size(), 1);

    assert!(db.remove(&artifact("A-1", "any title")));
    assert!(db.is_empty());
    assert!(!db.remove_by_accession("A-1"));
}

#[test]
fn remove_finds_records_in_any_order() {
    let db = Database::new();
    for acc in ["C", "A", "E", "B", "D"] {
        db.add(artifact(acc, acc)).unwrap();
    }
    assert!(db.remove_by_accession("B"));
    assert!(db.remove_by_accession("E"));

    let mut left = db.snapshot();
    left.sort_by(|a, b| a.accession_number.cmp(&b.accession_number));
    assert_eq!(accessions(&left), vec!["A", "C", "D"]);
}

#[test]
fn snapshot_is_a_copy() {
    let db = Database::new();
    db.add(artifact("A-1", "Original")).unwrap();

    let mut copy = db.snapshot();
    copy[0].title = "Changed outside".to_string();
    copy.clear();

    assert_eq!(db.size(), 1);
    assert_eq!(db.get("A-1").unwrap().title, "Original");
}

#[test]
fn concurrent_adds_and_searches() {
    let db = Arc::new(Database::new());

    thread::scope(|scope| {
        for worker in 0..4 {
            let db = db.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    db.add(artifact(&format!("W{}-{:03}", worker, i), "Barn photo")).unwrap();
                }
            });
        }
        let db = db.clone();
        scope.spawn(move || {
            for _ in 0..20 {
                let hits = db.search_text(
                    mhs_collections::SearchField::Text(mhs_collections::StringField::Title),
                    "barn",
                );
                assert!(hits.len() <= 200);
            }
        });
    });

    assert_eq!(db.size(), 200);
    assert!(db.add(artifact("W2-010", "again")).unwrap_err().is_duplicate());
}
