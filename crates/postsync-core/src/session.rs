use crate::storage_client::ObjectStorageClient;

/// Mutable state of one editing session.
///
/// Holds the editor buffers and the storage handle set by the last successful
/// initialization. Orchestrator operations take it by `&mut`, so at most one
/// operation runs against a session at a time.
#[derive(Default)]
pub struct Session {
    storage: Option<ObjectStorageClient>,
    json_buffer: String,
    markdown_buffer: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markdown(markdown: impl Into<String>) -> Self {
        Self {
            markdown_buffer: markdown.into(),
            ..Self::default()
        }
    }

    pub fn json_buffer(&self) -> &str {
        &self.json_buffer
    }

    pub fn markdown_buffer(&self) -> &str {
        &self.markdown_buffer
    }

    pub fn is_initialized(&self) -> bool {
        self.storage.is_some()
    }

    pub(crate) fn storage(&self) -> Option<&ObjectStorageClient> {
        self.storage.as_ref()
    }

    pub(crate) fn set_storage(&mut self, storage: Option<ObjectStorageClient>) {
        self.storage = storage;
    }

    pub(crate) fn set_json_buffer(&mut self, text: String) {
        self.json_buffer = text;
    }

    pub(crate) fn set_markdown_buffer(&mut self, text: String) {
        self.markdown_buffer = text;
    }
}
