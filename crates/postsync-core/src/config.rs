use std::fmt;

/// Storage half of a configuration snapshot.
///
/// Captured by value when an intent fires; later edits to the form never
/// reach an operation already holding a snapshot.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageSnapshot {
    /// S3-compatible endpoint, e.g. `https://<account>.r2.cloudflarestorage.com`
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for StorageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSnapshot")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Immutable bundle of everything an operation needs from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// URL of the posts JSON document (GET to fetch, POST to replace)
    pub api_url: String,
    pub storage: StorageSnapshot,
}
