use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KeyPage, ObjectStore, StoreError};
use crate::error::PublishStep;

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Number of primitive calls made against a [`MemoryStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub list: usize,
    pub delete: usize,
    pub put: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.list + self.delete + self.put
    }
}

#[derive(Default)]
struct MemoryState {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    calls: StoreCalls,
    failing: HashSet<PublishStep>,
}

/// In-process bucket store with S3 listing order and paging.
///
/// Clones share state. Individual primitives can be made to fail to
/// exercise partial-publish paths.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Cap listing pages at `page_size` keys (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().await;
        state
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        state.buckets.get(bucket)?.get(key).cloned()
    }

    /// All keys in `bucket`, in lexicographic order.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn calls(&self) -> StoreCalls {
        self.state.lock().await.calls
    }

    /// Make every subsequent call of `step` fail until [`MemoryStore::recover`].
    pub async fn fail_on(&self, step: PublishStep) {
        self.state.lock().await.failing.insert(step);
    }

    pub async fn recover(&self) {
        self.state.lock().await.failing.clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<KeyPage, StoreError> {
        let mut state = self.state.lock().await;
        state.calls.list += 1;
        if state.failing.contains(&PublishStep::List) {
            return Err(StoreError::Backend("injected list failure".to_string()));
        }

        let Some(objects) = state.buckets.get(bucket) else {
            return Ok(KeyPage::default());
        };

        let mut matching = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| continuation.as_deref().is_none_or(|after| key.as_str() > after));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next = match (matching.next(), keys.last()) {
            (Some(_), Some(last)) => Some(last.clone()),
            _ => None,
        };

        Ok(KeyPage { keys, next })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.calls.delete += 1;
        if state.failing.contains(&PublishStep::Delete) {
            return Err(StoreError::Backend("injected delete failure".to_string()));
        }

        // Deleting a missing key succeeds, as on S3.
        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.calls.put += 1;
        if state.failing.contains(&PublishStep::Put) {
            return Err(StoreError::Backend("injected put failure".to_string()));
        }

        state
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }
}
