//! Arbitrary table file contents must load or fail with an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reportdb::{Config, RecordId, ReportDB, SyncMode};

fuzz_target!(|data: &[u8]| {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bugs.csv"), data).unwrap();

    let config = Config {
        sync_mode: SyncMode::Fast,
        ..Default::default()
    };
    let db = ReportDB::open(dir.path(), config).unwrap();

    if let Ok(bugs) = db.list_bugs() {
        if let Some(first) = bugs.first() {
            let before = first.upvotes;
            assert!(db.upvote_bug(first.id).unwrap());
            let after = db.get_bug(first.id).unwrap().unwrap().upvotes;
            assert_eq!(after, before.saturating_add(1));
        }
        let _ = db.upvote_bug(RecordId(u64::MAX));
    }
});
