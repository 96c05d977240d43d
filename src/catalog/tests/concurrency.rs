use super::record;
use crate::catalog::*;
use crate::types::MediaKind;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_are_not_lost() {
    let dir = tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let mut handles = Vec::new();
    for i in 0..16 {
        // Separate store instances on the same base still share one lock.
        let store = CatalogStore::new(&base);
        let kind = if i % 2 == 0 {
            MediaKind::Video
        } else {
            MediaKind::Audio
        };
        handles.push(tokio::spawn(async move {
            store.insert(record(&format!("Item {i}"), kind), kind).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let catalog = CatalogStore::new(&base).read().await;
    assert_eq!(catalog.videos.len(), 8);
    assert_eq!(catalog.musics.len(), 8);
}

#[test]
fn test_stores_on_same_base_share_write_lock() {
    let dir = tempdir().unwrap();
    let a = CatalogStore::new(dir.path());
    let b = CatalogStore::new(dir.path());
    let other = tempdir().unwrap();
    let c = CatalogStore::new(other.path());

    assert!(std::sync::Arc::ptr_eq(&a.write_lock, &b.write_lock));
    assert!(!std::sync::Arc::ptr_eq(&a.write_lock, &c.write_lock));
}

#[test]
fn test_equivalent_base_paths_share_write_lock() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base");
    std::fs::create_dir(&base).unwrap();

    let plain = CatalogStore::new(&base);
    let dotted = CatalogStore::new(base.join("..").join("base"));
    assert!(std::sync::Arc::ptr_eq(&plain.write_lock, &dotted.write_lock));

    // A base opened before it exists keeps its lock once created.
    let later = dir.path().join("later");
    let before = CatalogStore::new(&later);
    std::fs::create_dir(&later).unwrap();
    let after = CatalogStore::new(&later);
    assert!(std::sync::Arc::ptr_eq(&before.write_lock, &after.write_lock));

    #[cfg(unix)]
    {
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&base, &link).unwrap();
        let linked = CatalogStore::new(&link);
        assert!(std::sync::Arc::ptr_eq(&plain.write_lock, &linked.write_lock));
    }
}
