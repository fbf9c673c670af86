//! Content synchronization layer for a posts editor.
//!
//! - `JsonApiClient`: fetch/replace the posts JSON document over HTTP
//! - `ObjectStorageClient`: publish Markdown bodies to an S3-compatible bucket
//! - `SyncOrchestrator`: turns operator intents into exactly one notification
//! - `preview`: render-ready projection of the Markdown buffer

mod config;
mod content_id;
mod error;
mod json_api;
mod orchestrator;
pub mod preview;
mod session;
pub mod storage;
mod storage_client;

pub use config::{ConfigSnapshot, StorageSnapshot};
pub use content_id::ContentId;
pub use error::{PublishStep, Result, SyncError};
pub use json_api::{JsonApiClient, JsonDocument};
pub use orchestrator::{Notification, SyncOrchestrator};
pub use preview::{ExtensionSet, RenderableMarkdown};
pub use session::Session;
pub use storage_client::{content_key, ObjectStorageClient, PublishReport};
