//! Explicit asset caches
//!
//! Layout, template and signature index are loaded at most once per cache;
//! signature images at most once per location. A cache can outlive a single
//! batch, so a long-running worker keeps its assets warm between jobs.

use crate::signatures::SignatureIndex;
use crate::source::AssetSource;
use crate::types::{BatchError, Result};
use pdf_diploma::{LayoutConfig, Template};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Keyed cache of shared values. Failed loads are not remembered.
#[derive(Debug)]
pub struct AssetCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for AssetCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> AssetCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `loader` on a miss.
    ///
    /// The lock is not held while loading, so two concurrent misses for the
    /// same key may both load; the first stored value wins.
    pub async fn get_or_load<F, Fut, E>(&self, key: &K, loader: F) -> std::result::Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(hit) = self.entries.lock().await.get(key) {
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new(loader().await?);
        let mut entries = self.entries.lock().await;
        Ok(Arc::clone(entries.entry(key.clone()).or_insert(value)))
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// Everything a batch loads from its [`AssetSource`]
#[derive(Debug, Default)]
pub struct BatchCache {
    layout: OnceCell<Arc<LayoutConfig>>,
    template: OnceCell<Arc<Template>>,
    signatures: OnceCell<Arc<SignatureIndex>>,
    signature_bytes: AssetCache<String, Vec<u8>>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn layout<S: AssetSource>(&self, source: &S) -> Result<Arc<LayoutConfig>> {
        let layout = self
            .layout
            .get_or_try_init(|| async {
                debug!("Loading layout");
                source.layout().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(layout))
    }

    pub async fn template<S: AssetSource>(&self, source: &S) -> Result<Arc<Template>> {
        let template = self
            .template
            .get_or_try_init(|| async {
                debug!("Loading template");
                let bytes = source.template().await?;
                let template =
                    tokio::task::spawn_blocking(move || Template::from_bytes(&bytes)).await??;
                Ok::<_, BatchError>(Arc::new(template))
            })
            .await?;
        Ok(Arc::clone(template))
    }

    pub async fn signatures<S: AssetSource>(&self, source: &S) -> Result<Arc<SignatureIndex>> {
        let index = self
            .signatures
            .get_or_try_init(|| async {
                debug!("Loading signature index");
                let entries = source.signatures().await?;
                Ok::<_, BatchError>(Arc::new(SignatureIndex::from_entries(entries)))
            })
            .await?;
        Ok(Arc::clone(index))
    }

    pub async fn signature_bytes<S: AssetSource>(
        &self,
        source: &S,
        location: &str,
    ) -> Result<Arc<Vec<u8>>> {
        self.signature_bytes
            .get_or_load(&location.to_string(), || source.signature_bytes(location))
            .await
    }
}
