//! Arbitrary submissions must either be stored and read back verbatim, or
//! be rejected as duplicates, never corrupt the table.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reportdb::{Config, ReportDB, SyncMode};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (description, steps) = text.split_once('\u{0}').unwrap_or((text, ""));

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        sync_mode: SyncMode::Fast,
        ..Default::default()
    };
    let db = ReportDB::open(dir.path(), config).unwrap();

    db.create_bug("seed", "seed", "seed entry", "seed").unwrap();
    let Ok(result) = db.create_bug("u1", "fuzz", description, steps) else {
        return;
    };

    let bugs = db.list_bugs().unwrap();
    match result.created_id() {
        Some(id) => {
            let stored = bugs.iter().find(|b| b.id == id).unwrap();
            assert_eq!(stored.primary, description);
            assert_eq!(stored.secondary, steps);
        }
        None => assert_eq!(bugs.len(), 1),
    }
});
