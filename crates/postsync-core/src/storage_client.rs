//! Upload-with-overwrite publishing of Markdown bodies.
//!
//! Publish sequence for content id `N`:
//! 1. list `N.md` as a prefix and look for an exact key match
//! 2. delete `N.md` if it exists
//! 3. put `N.md` with the new body
//!
//! The sequence is not transactional. A put failing after a successful delete
//! leaves the key absent, and the returned error names the failed step.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::config::StorageSnapshot;
use crate::content_id::ContentId;
use crate::error::{PublishStep, Result, SyncError};
use crate::storage::{ObjectStore, R2Store, StoreError};

/// Canonical object name for a content id.
pub fn content_key(content_id: &ContentId) -> String {
    format!("{}.md", content_id)
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub key: String,
    /// An object already existed at `key` and was deleted first.
    pub replaced: bool,
}

/// Handle on a bucket store. Cheap to clone; clones share per-key locks so
/// publishes to the same key never interleave. A lock entry lives only while
/// some publish holds or awaits it.
#[derive(Clone)]
pub struct ObjectStorageClient {
    store: Arc<dyn ObjectStore>,
    key_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ObjectStorageClient {
    /// Build an R2/S3 client from a configuration snapshot.
    pub fn connect(snapshot: &StorageSnapshot) -> Result<Self> {
        let store = R2Store::from_snapshot(snapshot)
            .map_err(|e| SyncError::Initialization(e.to_string()))?;
        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            key_locks: Arc::new(DashMap::new()),
        }
    }

    /// Whether an object named exactly `key` exists in `bucket`.
    ///
    /// The listing is a prefix query, so `1.md` also returns `1.md.bak`;
    /// only an exact name match counts.
    #[instrument(skip(self), level = "debug")]
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let mut continuation = None;
        loop {
            let page = self
                .store
                .list_keys(bucket, key, continuation.take())
                .await
                .map_err(|e| storage_error(PublishStep::List, key, e))?;

            if page.keys.iter().any(|candidate| candidate == key) {
                return Ok(true);
            }

            match page.next {
                Some(token) => continuation = Some(token),
                None => return Ok(false),
            }
        }
    }

    /// Publish `body` as `{content_id}.md`, replacing any existing object.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn publish(
        &self,
        bucket: &str,
        content_id: &ContentId,
        body: &str,
    ) -> Result<PublishReport> {
        let key = content_key(content_id);
        let lock_key = format!("{}/{}", bucket, key);

        let lock = self.key_locks.entry(lock_key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.replace_object(bucket, key, body).await
        };

        // Map entry plus our clone: nobody else is waiting on this key.
        self.key_locks
            .remove_if(&lock_key, |_, entry| Arc::strong_count(entry) == 2);
        result
    }

    async fn replace_object(&self, bucket: &str, key: String, body: &str) -> Result<PublishReport> {
        let replaced = self.exists(bucket, &key).await?;
        if replaced {
            self.store
                .delete_object(bucket, &key)
                .await
                .map_err(|e| storage_error(PublishStep::Delete, &key, e))?;
            debug!("Deleted existing object {}", key);
        }

        self.store
            .put_object(bucket, &key, body.as_bytes())
            .await
            .map_err(|e| storage_error(PublishStep::Put, &key, e))?;

        info!(key = %key, replaced, "Published markdown ({} bytes)", body.len());
        Ok(PublishReport { key, replaced })
    }
}

fn storage_error(step: PublishStep, key: &str, err: StoreError) -> SyncError {
    SyncError::Storage {
        step,
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const BUCKET: &str = "posts";

    fn client(store: &MemoryStore) -> ObjectStorageClient {
        ObjectStorageClient::with_store(Arc::new(store.clone()))
    }

    fn id(value: i64) -> ContentId {
        ContentId::from(value)
    }

    #[test]
    fn test_content_key() {
        assert_eq!(content_key(&id(0)), "0.md");
        assert_eq!(content_key(&id(42)), "42.md");
        assert_eq!(content_key(&id(-3)), "-3.md");
        assert_eq!(
            content_key(&"18446744073709551616".parse().unwrap()),
            "18446744073709551616.md"
        );
    }

    #[tokio::test]
    async fn test_publish_negative_id() {
        let store = MemoryStore::new();
        let report = client(&store).publish(BUCKET, &id(-3), "neg").await.unwrap();

        assert_eq!(report.key, "-3.md");
        assert_eq!(store.get(BUCKET, "-3.md").await, Some(b"neg".to_vec()));
    }

    #[tokio::test]
    async fn test_publish_into_empty_bucket() {
        let store = MemoryStore::new();
        let report = client(&store).publish(BUCKET, &id(42), "## hi").await.unwrap();

        assert_eq!(
            report,
            PublishReport {
                key: "42.md".to_string(),
                replaced: false
            }
        );
        assert_eq!(store.keys(BUCKET).await, vec!["42.md"]);
        assert_eq!(store.get(BUCKET, "42.md").await, Some(b"## hi".to_vec()));
        assert_eq!(store.calls().await.delete, 0);
    }

    #[tokio::test]
    async fn test_publish_twice_keeps_single_latest_object() {
        let store = MemoryStore::new();
        let client = client(&store);

        client.publish(BUCKET, &id(42), "## hi").await.unwrap();
        let report = client.publish(BUCKET, &id(42), "## bye").await.unwrap();

        assert!(report.replaced);
        assert_eq!(store.keys(BUCKET).await, vec!["42.md"]);
        assert_eq!(store.get(BUCKET, "42.md").await, Some(b"## bye".to_vec()));
    }

    #[tokio::test]
    async fn test_publish_same_body_twice_is_idempotent() {
        let store = MemoryStore::new();
        let client = client(&store);

        client.publish(BUCKET, &id(7), "same").await.unwrap();
        let after_first = store.keys(BUCKET).await;
        client.publish(BUCKET, &id(7), "same").await.unwrap();

        assert_eq!(store.keys(BUCKET).await, after_first);
        assert_eq!(store.get(BUCKET, "7.md").await, Some(b"same".to_vec()));
    }

    #[tokio::test]
    async fn test_exact_key_isolation_from_adjacent_keys() {
        let store = MemoryStore::new();
        for key in ["10.md", "12.md", "1.md.bak", "1.mdx"] {
            store.insert(BUCKET, key, "neighbour").await;
        }
        let client = client(&store);

        assert!(!client.exists(BUCKET, "1.md").await.unwrap());

        let report = client.publish(BUCKET, &id(1), "one").await.unwrap();
        assert!(!report.replaced);
        assert_eq!(store.calls().await.delete, 0);
        assert_eq!(
            store.keys(BUCKET).await,
            vec!["1.md", "1.md.bak", "1.mdx", "10.md", "12.md"]
        );
        assert_eq!(store.get(BUCKET, "12.md").await, Some(b"neighbour".to_vec()));
    }

    #[tokio::test]
    async fn test_exists_follows_pagination() {
        let store = MemoryStore::new().with_page_size(1);
        for key in ["6.md-draft", "6.md.a", "6.md.b"] {
            store.insert(BUCKET, key, "x").await;
        }
        let client = client(&store);

        assert!(!client.exists(BUCKET, "6.md").await.unwrap());
        assert_eq!(store.calls().await.list, 3);

        store.insert(BUCKET, "6.md", "x").await;
        assert!(client.exists(BUCKET, "6.md").await.unwrap());
        assert_eq!(store.calls().await.list, 4);
    }

    #[tokio::test]
    async fn test_put_failure_after_delete_reports_step() {
        let store = MemoryStore::new();
        store.insert(BUCKET, "3.md", "old").await;
        store.fail_on(PublishStep::Put).await;

        let err = client(&store).publish(BUCKET, &id(3), "new").await.unwrap_err();

        match err {
            SyncError::Storage { step, key, .. } => {
                assert_eq!(step, PublishStep::Put);
                assert_eq!(key, "3.md");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Deleted, not yet replaced.
        assert!(store.get(BUCKET, "3.md").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_old_object() {
        let store = MemoryStore::new();
        store.insert(BUCKET, "8.md", "old").await;
        store.fail_on(PublishStep::Delete).await;

        let err = client(&store).publish(BUCKET, &id(8), "new").await.unwrap_err();

        match err {
            SyncError::Storage { step, key, .. } => {
                assert_eq!(step, PublishStep::Delete);
                assert_eq!(key, "8.md");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.calls().await.put, 0);
        assert_eq!(store.get(BUCKET, "8.md").await, Some(b"old".to_vec()));
    }

    #[tokio::test]
    async fn test_key_locks_released_after_publish() {
        let store = MemoryStore::new();
        let client = client(&store);

        client.publish(BUCKET, &id(1), "a").await.unwrap();
        client.publish(BUCKET, &id(2), "b").await.unwrap();
        assert!(client.key_locks.is_empty());

        store.fail_on(PublishStep::Put).await;
        assert!(client.publish(BUCKET, &id(3), "c").await.is_err());
        assert!(client.key_locks.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_touches_nothing() {
        let store = MemoryStore::new();
        store.insert(BUCKET, "3.md", "old").await;
        store.fail_on(PublishStep::List).await;

        let err = client(&store).publish(BUCKET, &id(3), "new").await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Storage {
                step: PublishStep::List,
                ..
            }
        ));
        assert_eq!(store.get(BUCKET, "3.md").await, Some(b"old".to_vec()));
        let calls = store.calls().await;
        assert_eq!((calls.delete, calls.put), (0, 0));
    }

    #[tokio::test]
    async fn test_concurrent_publishes_to_same_key_serialize() {
        let store = MemoryStore::new();
        let client = client(&store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.publish(BUCKET, &id(9), &format!("body {}", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.keys(BUCKET).await, vec!["9.md"]);
        let calls = store.calls().await;
        assert_eq!(calls.put, 8);
        assert_eq!(calls.delete, 7);
        assert!(client.key_locks.is_empty());
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_endpoint() {
        let snapshot = StorageSnapshot {
            endpoint: "not a url".to_string(),
            bucket: BUCKET.to_string(),
            access_key: "AKID".to_string(),
            secret_key: "secret".to_string(),
        };

        assert!(matches!(
            ObjectStorageClient::connect(&snapshot),
            Err(SyncError::Initialization(_))
        ));
    }
}
