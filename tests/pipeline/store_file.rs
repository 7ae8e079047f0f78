use slopwatch::core::store::{JsonFileStore, SeenIdSet, SeenStore};
use tempfile::TempDir;

#[tokio::test]
async fn round_trip_preserves_membership() {
    let dir = TempDir::new().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("cache.json"));
    let seen: SeenIdSet = ["a", "b", "c"].into_iter().collect();

    store.save(&seen).await.expect("save");
    let loaded = store.load().await;

    assert_eq!(loaded.len(), 3);
    for id in ["a", "b", "c"] {
        assert!(loaded.contains(id));
    }
}

#[tokio::test]
async fn reordered_file_loads_as_the_same_set() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("cache.json");
    std::fs::write(&path, r#"["c","a","b"]"#).expect("seed");

    let loaded = JsonFileStore::new(&path).load().await;

    let mut ids: Vec<&str> = loaded.iter().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn missing_and_malformed_files_load_empty() {
    let dir = TempDir::new().expect("tempdir");

    let missing = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(missing.load().await.is_empty());

    for garbage in ["not json", "{\"a\": 1}", "[1, 2]", ""] {
        let path = dir.path().join("bad.json");
        std::fs::write(&path, garbage).expect("seed");
        assert!(
            JsonFileStore::new(&path).load().await.is_empty(),
            "{garbage:?} should load as empty"
        );
    }
}
