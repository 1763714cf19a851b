use synapse_cache::{ResultCache, SnapshotStore, TtlStatus};

#[test]
fn cache_survives_restart_through_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synapse_cache.db");
    let path = path.to_str().unwrap();

    let cache = ResultCache::new();
    cache
        .set_with_tags("scenario:abc", &"reroute", &["traffic_disruption"], 3600)
        .unwrap();
    cache.set("pinned", &42, 0).unwrap();

    {
        let mut store = SnapshotStore::open(path).unwrap();
        let written = store.save(&cache.export_entries().unwrap()).unwrap();
        assert_eq!(written, 3);
    }

    let store = SnapshotStore::open(path).unwrap();
    let restarted = ResultCache::new();
    let restored = restarted.restore(store.load().unwrap()).unwrap();
    assert_eq!(restored, 3);

    let value: Option<String> = restarted.get("scenario:abc").unwrap();
    assert_eq!(value.as_deref(), Some("reroute"));
    assert_eq!(restarted.ttl("pinned").unwrap(), TtlStatus::NoExpiry);

    let tagged: Vec<(String, String)> = restarted.get_by_tag("traffic_disruption").unwrap();
    assert_eq!(tagged.len(), 1);
}

#[test]
fn expired_entries_are_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synapse_cache.db");
    let path = path.to_str().unwrap();

    let cache = ResultCache::new();
    cache.set("short", &1, 1).unwrap();
    cache.set("long", &2, 3600).unwrap();

    let mut store = SnapshotStore::open(path).unwrap();
    store.save(&cache.export_entries().unwrap()).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(1100));

    let restarted = ResultCache::new();
    restarted.restore(store.load().unwrap()).unwrap();
    assert_eq!(restarted.keys("*").unwrap(), vec!["long".to_string()]);
}
