//! Integration tests for create-with-dedup.
//!
//! A submission is stored only when no existing record of the same kind
//! shares enough words with it; otherwise the similar records come back and
//! nothing is written.

use reportdb::{
    Config, CreateResult, RecordId, RecordStatus, ReportDB, ReportDBError, SyncMode,
    ValidationError,
};
use tempfile::{tempdir, TempDir};

/// Helper: open a fresh database in a temporary directory.
fn open_db() -> (TempDir, ReportDB) {
    let dir = tempdir().unwrap();
    let config = Config {
        sync_mode: SyncMode::Fast,
        ..Default::default()
    };
    let db = ReportDB::open(dir.path(), config).unwrap();
    (dir, db)
}

// ============================================================================
// Bugs
// ============================================================================

#[test]
fn test_first_bug_gets_id_one() {
    let (_dir, db) = open_db();

    let result = db
        .create_bug("u1", "alice", "crash on save", "open save menu")
        .unwrap();

    assert_eq!(result, CreateResult::Created { id: RecordId(1) });

    let bugs = db.list_bugs().unwrap();
    assert_eq!(bugs.len(), 1);
    assert_eq!(bugs[0].user_id, "u1");
    assert_eq!(bugs[0].username, "alice");
    assert_eq!(bugs[0].primary, "crash on save");
    assert_eq!(bugs[0].secondary, "open save menu");
    assert_eq!(bugs[0].status, RecordStatus::Open);
    assert_eq!(bugs[0].upvotes, 0);
}

#[test]
fn test_overlapping_bug_is_duplicate() {
    let (_dir, db) = open_db();
    db.create_bug("u1", "alice", "crash on save menu", "open save menu")
        .unwrap();

    // 3 of 4 words shared: 0.75
    let result = db
        .create_bug("u2", "bob", "crash on save", "click save then crash")
        .unwrap();

    assert!(result.is_duplicate());
    let similar = result.similar_entries();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].id, RecordId(1));
    assert_eq!(similar[0].username, "alice");

    // No new row appended
    assert_eq!(db.list_bugs().unwrap().len(), 1);
}

#[test]
fn test_low_overlap_bug_is_created() {
    let (_dir, db) = open_db();
    db.create_bug("u1", "alice", "crash on save", "open save menu")
        .unwrap();

    // Only "crash" is shared: 1/3
    let result = db
        .create_bug("u2", "bob", "crash when saving", "click save then crash")
        .unwrap();

    assert_eq!(result.created_id(), Some(RecordId(2)));
    assert_eq!(db.list_bugs().unwrap().len(), 2);
}

#[test]
fn test_similarity_ignores_case_and_spacing() {
    let (_dir, db) = open_db();
    db.create_bug("u1", "alice", "Login Button Broken", "tap login")
        .unwrap();

    let result = db
        .create_bug("u2", "bob", "login   button\tbroken", "tap it")
        .unwrap();

    assert!(result.is_duplicate());
}

#[test]
fn test_duplicate_lists_every_match_in_storage_order() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("bugs.csv"),
        "id,user_id,username,description,steps,created_at,status,upvotes\n\
         1,u1,alice,app freezes on startup,launch,2024-05-01T09:30:00.000Z,open,0\n\
         2,u2,bob,settings page empty,open settings,2024-05-01T09:31:00.000Z,open,3\n\
         3,u3,carol,App freezes on startup,launch twice,2024-05-01T09:32:00.000Z,closed,1\n",
    )
    .unwrap();
    let db = ReportDB::open(dir.path(), Config::default()).unwrap();

    let result = db
        .create_bug("u4", "dave", "app freezes on startup", "launch")
        .unwrap();

    let ids: Vec<u64> = result
        .similar_entries()
        .iter()
        .map(|r| r.id.get())
        .collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(
        result.similar_entries()[1].status,
        RecordStatus::Other("closed".into())
    );
    assert_eq!(db.list_bugs().unwrap().len(), 3);
}

#[test]
fn test_only_primary_text_is_compared() {
    let (_dir, db) = open_db();
    db.create_bug("u1", "alice", "crash on save", "open the save menu")
        .unwrap();

    let result = db
        .create_bug("u2", "bob", "toolbar icons blurry", "open the save menu")
        .unwrap();

    assert_eq!(result.created_id(), Some(RecordId(2)));
}

// ============================================================================
// Features
// ============================================================================

#[test]
fn test_disjoint_features_get_sequential_ids() {
    let (_dir, db) = open_db();

    let first = db
        .create_feature("u1", "alice", "dark mode", "easier at night")
        .unwrap();
    let second = db
        .create_feature("u2", "bob", "export to pdf", "share reports")
        .unwrap();

    assert_eq!(first.created_id(), Some(RecordId(1)));
    assert_eq!(second.created_id(), Some(RecordId(2)));

    let features = db.list_features().unwrap();
    assert_eq!(features.len(), 2);
    assert!(features.iter().all(|f| f.status == RecordStatus::Pending));
}

#[test]
fn test_feature_duplicate() {
    let (_dir, db) = open_db();
    db.create_feature("u1", "alice", "add dark mode", "eyes")
        .unwrap();

    let result = db
        .create_feature("u2", "bob", "Add Dark Mode", "battery")
        .unwrap();

    assert!(result.is_duplicate());
    assert_eq!(db.list_features().unwrap().len(), 1);
}

#[test]
fn test_kinds_do_not_dedup_against_each_other() {
    let (_dir, db) = open_db();
    db.create_bug("u1", "alice", "dark mode unreadable", "enable it")
        .unwrap();

    let result = db
        .create_feature("u1", "alice", "dark mode unreadable", "enable it")
        .unwrap();

    assert_eq!(result.created_id(), Some(RecordId(1)));
}

// ============================================================================
// Text Handling
// ============================================================================

#[test]
fn test_separator_characters_stored_verbatim() {
    let (_dir, db) = open_db();
    let description = "crash, then \"hang\"";
    let steps = "line one\nline two, with comma";

    db.create_bug("u1", "alice", description, steps).unwrap();

    let bug = db.get_bug(RecordId(1)).unwrap().unwrap();
    assert_eq!(bug.primary, description);
    assert_eq!(bug.secondary, steps);
}

#[test]
fn test_empty_description_allowed() {
    let (_dir, db) = open_db();

    let first = db.create_bug("u1", "alice", "", "steps").unwrap();
    assert_eq!(first.created_id(), Some(RecordId(1)));

    // Empty text matches other empty text
    let second = db.create_bug("u2", "bob", "", "other").unwrap();
    assert!(second.is_duplicate());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_missing_user_rejected() {
    let (_dir, db) = open_db();

    let err = db.create_bug("", "alice", "crash", "steps").unwrap_err();
    assert!(matches!(
        err,
        ReportDBError::Validation(ValidationError::RequiredField { ref field }) if field == "user_id"
    ));

    let err = db.create_feature("u1", "", "dark", "mode").unwrap_err();
    assert!(matches!(
        err,
        ReportDBError::Validation(ValidationError::RequiredField { ref field }) if field == "username"
    ));

    assert!(db.list_bugs().unwrap().is_empty());
    assert!(db.list_features().unwrap().is_empty());
}

#[test]
fn test_oversized_text_rejected() {
    let dir = tempdir().unwrap();
    let config = Config {
        max_text_size: 16,
        sync_mode: SyncMode::Fast,
        ..Default::default()
    };
    let db = ReportDB::open(dir.path(), config).unwrap();

    let err = db
        .create_feature("u1", "alice", "a".repeat(17), "why")
        .unwrap_err();

    assert!(matches!(
        err,
        ReportDBError::Validation(ValidationError::ContentTooLarge { ref field, size: 17, max: 16 })
            if field == "feature"
    ));
}
