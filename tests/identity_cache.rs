use std::fs;

use nba_digest::identity_cache::{CacheEntry, IdentityCache, PendingEntry};

#[test]
fn save_then_load_keeps_both_entry_forms() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("names_cache.json"),
        r#"{ "1966": "Джеймс", "3975": { "given": "Стефен", "family": "Карри" } }"#,
    )
    .expect("seed cache");

    let mut cache = IdentityCache::load(dir.path());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.lookup("1966"), Some(&CacheEntry::Legacy("Джеймс".into())));
    assert!(!cache.is_dirty());

    assert!(cache.upsert("4065648", "Джейсон", "Тейтум"));
    assert!(cache.enqueue_pending("99", "Jane", "Doe"));
    cache.save().expect("save cache");

    assert!(!dir.path().join("names_cache.json.tmp").exists());
    let reloaded = IdentityCache::load(dir.path());
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.lookup("1966"), Some(&CacheEntry::Legacy("Джеймс".into())));
    assert_eq!(
        reloaded.lookup("4065648"),
        Some(&CacheEntry::Structured {
            given: "Джейсон".into(),
            family: "Тейтум".into()
        })
    );
    assert_eq!(
        reloaded.pending(),
        &[PendingEntry {
            id: "99".into(),
            given: "Jane".into(),
            family: "Doe".into()
        }]
    );
}

#[test]
fn missing_or_corrupt_files_load_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = IdentityCache::load(dir.path());
    assert!(cache.is_empty());
    assert!(cache.pending().is_empty());

    fs::write(dir.path().join("names_cache.json"), "{ broken").expect("write");
    fs::write(dir.path().join("pending_names.json"), "42").expect("write");
    let cache = IdentityCache::load(dir.path());
    assert!(cache.is_empty());
    assert!(cache.pending().is_empty());
}

#[test]
fn save_creates_missing_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let nested = dir.path().join("nba_digest");
    let mut cache = IdentityCache::load(&nested);
    cache.upsert("1", "Лука", "Дончич");
    cache.save().expect("save cache");
    assert!(nested.join("names_cache.json").exists());
    assert!(nested.join("pending_names.json").exists());
}

#[test]
fn localized_family_is_never_regressed() {
    let mut cache = IdentityCache::in_memory();
    assert!(cache.upsert("1", "Никола", "Йокич"));
    assert!(!cache.upsert("1", "", "Jokic"));
    assert_eq!(cache.lookup("1").map(CacheEntry::family), Some("Йокич"));

    assert!(!cache.upsert("1", "", "Йокич"));
    assert_eq!(cache.lookup("1").map(CacheEntry::given), Some("Никола"));

    let mut legacy = IdentityCache::with_entries(
        [("2".to_string(), CacheEntry::Legacy("Дончич".into()))],
        Vec::new(),
    );
    assert!(!legacy.upsert("2", "Luka", "Doncic"));
    assert!(legacy.upsert("2", "Лука", "Дончич"));
    assert_eq!(legacy.lookup("2").map(CacheEntry::given), Some("Лука"));
}

#[test]
fn enqueue_pending_is_idempotent() {
    let mut cache = IdentityCache::with_entries(
        [(
            "ok".to_string(),
            CacheEntry::Structured {
                given: "Лука".into(),
                family: "Дончич".into(),
            },
        )],
        vec![PendingEntry {
            id: "old".into(),
            given: "A".into(),
            family: "B".into(),
        }],
    );
    assert!(!cache.enqueue_pending("ok", "Luka", "Doncic"));
    assert!(!cache.enqueue_pending("old", "A", "B"));
    assert!(!cache.enqueue_pending("", "A", "B"));
    assert!(cache.enqueue_pending("new", "Jane", "Doe"));
    assert!(!cache.enqueue_pending("new", "Jane", "Doe"));
    assert_eq!(cache.pending().len(), 2);
}
