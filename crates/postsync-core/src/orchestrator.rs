//! Maps operator intents onto the JSON API and object storage clients.
//!
//! Each intent has two forms: a `Result`-returning operation (`fetch`,
//! `save`, `upload`, `initialize`) and an `on_*` wrapper that folds the
//! result into exactly one [`Notification`]. The dispatch layer only uses
//! the wrappers, so no error escapes a session.

use std::fmt;

use tracing::{info, warn};

use crate::config::{ConfigSnapshot, StorageSnapshot};
use crate::content_id::ContentId;
use crate::error::{Result, SyncError};
use crate::json_api::{JsonApiClient, JsonDocument};
use crate::preview::{self, RenderableMarkdown};
use crate::session::Session;
use crate::storage_client::{ObjectStorageClient, PublishReport};

type Connector = dyn Fn(&StorageSnapshot) -> Result<ObjectStorageClient> + Send + Sync;

/// User-facing outcome of one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(message) | Notification::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub struct SyncOrchestrator {
    json_api: JsonApiClient,
    connector: Box<Connector>,
}

impl Default for SyncOrchestrator {
    fn default() -> Self {
        Self::new(JsonApiClient::new())
    }
}

impl SyncOrchestrator {
    /// Orchestrator that initializes R2/S3 storage clients.
    pub fn new(json_api: JsonApiClient) -> Self {
        Self {
            json_api,
            connector: Box::new(ObjectStorageClient::connect),
        }
    }

    /// Replace how `initialize` builds storage clients.
    pub fn with_connector<F>(mut self, connector: F) -> Self
    where
        F: Fn(&StorageSnapshot) -> Result<ObjectStorageClient> + Send + Sync + 'static,
    {
        self.connector = Box::new(connector);
        self
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Fetch the posts document and load its pretty-printed form into the
    /// session's JSON buffer. The buffer is left untouched on failure.
    pub async fn fetch(
        &self,
        session: &mut Session,
        config: &ConfigSnapshot,
    ) -> Result<JsonDocument> {
        let document = self.json_api.fetch(&config.api_url).await?;
        session.set_json_buffer(document.to_pretty_string());
        Ok(document)
    }

    /// The notification carries only the status. On success the
    /// pretty-printed document is in [`Session::json_buffer`].
    pub async fn on_fetch(&self, session: &mut Session, config: &ConfigSnapshot) -> Notification {
        match self.fetch(session, config).await {
            Ok(_) => succeed("Posts fetched successfully!".to_string()),
            Err(e) => fail(format!("Failed to fetch posts: {}", e)),
        }
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Parse `raw_text` and replace the remote document with it. Text that is
    /// not JSON never reaches the network.
    pub async fn save(&self, config: &ConfigSnapshot, raw_text: &str) -> Result<JsonDocument> {
        let document = JsonDocument::parse(raw_text)
            .map_err(|e| SyncError::InvalidInput(format!("Invalid JSON format: {}", e)))?;
        self.json_api.replace(&config.api_url, &document).await?;
        Ok(document)
    }

    pub async fn on_save(&self, config: &ConfigSnapshot, raw_text: &str) -> Notification {
        match self.save(config, raw_text).await {
            Ok(_) => succeed("Posts updated successfully!".to_string()),
            Err(SyncError::InvalidInput(message)) => fail(message),
            Err(e) => fail(format!("Failed to update posts: {}", e)),
        }
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Build a storage client from `storage` and keep it in the session.
    ///
    /// A failed initialization clears any previous handle so that uploads
    /// never run with credentials the operator has since replaced.
    pub fn initialize(&self, session: &mut Session, storage: &StorageSnapshot) -> Result<()> {
        match (self.connector)(storage) {
            Ok(client) => {
                session.set_storage(Some(client));
                Ok(())
            }
            Err(e) => {
                session.set_storage(None);
                Err(match e {
                    err @ SyncError::Initialization(_) => err,
                    other => SyncError::Initialization(other.to_string()),
                })
            }
        }
    }

    pub fn on_initialize(&self, session: &mut Session, storage: &StorageSnapshot) -> Notification {
        match self.initialize(session, storage) {
            Ok(()) => succeed("Storage client initialized successfully.".to_string()),
            Err(e) => fail(format!("Failed to initialize storage client: {}", e)),
        }
    }

    /// Publish `body` under the content id typed by the operator.
    pub async fn upload(
        &self,
        session: &Session,
        config: &ConfigSnapshot,
        content_id_text: &str,
        body: &str,
    ) -> Result<PublishReport> {
        let content_id: ContentId = content_id_text.parse()?;
        let client = session.storage().ok_or(SyncError::NotInitialized)?;

        let bucket = config.storage.bucket.trim();
        if bucket.is_empty() {
            return Err(SyncError::InvalidInput("Bucket name is empty".to_string()));
        }

        client.publish(bucket, &content_id, body).await
    }

    pub async fn on_upload(
        &self,
        session: &Session,
        config: &ConfigSnapshot,
        content_id_text: &str,
        body: &str,
    ) -> Notification {
        match self.upload(session, config, content_id_text, body).await {
            Ok(report) if report.replaced => succeed(format!(
                "Markdown uploaded successfully as {} (replaced existing object).",
                report.key
            )),
            Ok(report) => succeed(format!("Markdown uploaded successfully as {}.", report.key)),
            Err(SyncError::InvalidInput(message)) => fail(message),
            Err(SyncError::NotInitialized) => fail(
                "Storage client is not initialized. Run initialize before uploading.".to_string(),
            ),
            Err(e) => fail(format!("Failed to upload markdown: {}", e)),
        }
    }

    // =========================================================================
    // Editor buffers
    // =========================================================================

    /// Store an edit of the Markdown buffer and return its preview.
    pub fn on_markdown_edit(&self, session: &mut Session, text: &str) -> RenderableMarkdown {
        session.set_markdown_buffer(text.to_string());
        preview::project(text)
    }

    pub fn on_json_edit(&self, session: &mut Session, text: &str) {
        session.set_json_buffer(text.to_string());
    }
}

fn succeed(message: String) -> Notification {
    info!("{}", message);
    Notification::Success(message)
}

fn fail(message: String) -> Notification {
    warn!("{}", message);
    Notification::Failure(message)
}
