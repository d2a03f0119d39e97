use pdf_diploma_batch::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn test_asset_cache_loads_once_per_key() {
    let cache: AssetCache<String, Vec<u8>> = AssetCache::new();
    let loads = AtomicUsize::new(0);

    for _ in 0..3 {
        let value = cache
            .get_or_load(&"a".to_string(), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BatchError>(vec![1, 2, 3])
            })
            .await
            .unwrap();
        assert_eq!(*value, vec![1, 2, 3]);
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_asset_cache_does_not_remember_failures() {
    let cache: AssetCache<String, u32> = AssetCache::new();
    let key = "firma".to_string();

    let failed = cache
        .get_or_load(&key, || async {
            Err::<u32, _>(BatchError::Asset("offline".to_string()))
        })
        .await;
    assert!(failed.is_err());
    assert!(cache.is_empty().await);

    let value = cache
        .get_or_load(&key, || async { Ok::<_, BatchError>(7) })
        .await
        .unwrap();
    assert_eq!(*value, 7);
}

#[tokio::test]
async fn test_asset_cache_keys_are_independent() {
    let cache: AssetCache<String, String> = AssetCache::new();
    let a = cache
        .get_or_load(&"a".to_string(), || async { Ok::<_, BatchError>("A".to_string()) })
        .await
        .unwrap();
    let b = cache
        .get_or_load(&"b".to_string(), || async { Ok::<_, BatchError>("B".to_string()) })
        .await
        .unwrap();
    assert_eq!((a.as_str(), b.as_str()), ("A", "B"));

    cache.clear().await;
    assert!(cache.is_empty().await);
}
