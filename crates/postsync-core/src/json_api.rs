//! HTTP client for the posts JSON document.
//!
//! The document is opaque here: whatever the API returns is round-tripped,
//! never validated against a schema. `replace` is a pass-through POST; whether
//! the server overwrites or merges is up to the server.

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{Result, SyncError};

/// Arbitrary JSON value as fetched from (or sent to) the posts API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonDocument(Value);

impl JsonDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Render with four-space indentation, leaving non-ASCII characters as-is.
    pub fn to_pretty_string(&self) -> String {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        // Serializing a Value into memory cannot fail.
        if self.0.serialize(&mut serializer).is_err() {
            return self.0.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl From<Value> for JsonDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Fetch/replace client for a JSON document served over HTTP.
#[derive(Clone, Default)]
pub struct JsonApiClient {
    http: HttpClient,
}

impl JsonApiClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
        }
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, TLS roots).
    pub fn with_http_client(http: HttpClient) -> Self {
        Self { http }
    }

    /// GET the document at `url`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<JsonDocument> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::Transport(format!(
                "GET {} returned status {}: {}",
                url, status, text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to read response body: {}", e)))?;

        let document = JsonDocument::parse(&body)
            .map_err(|e| SyncError::Decode(format!("Response is not valid JSON: {}", e)))?;

        debug!("Fetched document from {} ({} bytes)", url, body.len());
        Ok(document)
    }

    /// POST `document` as the request body. Any 2xx status counts as success.
    #[instrument(skip(self, document), level = "debug")]
    pub async fn replace(&self, url: &str, document: &JsonDocument) -> Result<()> {
        let response = self
            .http
            .post(url)
            .json(document)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::Transport(format!(
                "POST {} returned status {}: {}",
                url, status, text
            )));
        }

        debug!("Replaced document at {} (status {})", url, status);
        Ok(())
    }
}
