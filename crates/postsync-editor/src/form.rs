use std::fmt;

use postsync_core::{ConfigSnapshot, StorageSnapshot};

use crate::intent::Field;

/// Editable configuration fields. Lives only in memory for the session.
#[derive(Debug, Clone, Default)]
pub struct ConfigForm {
    api_url: String,
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
}

impl ConfigForm {
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::ApiUrl => &mut self.api_url,
            Field::Endpoint => &mut self.endpoint,
            Field::Bucket => &mut self.bucket,
            Field::AccessKey => &mut self.access_key,
            Field::SecretKey => &mut self.secret_key,
        };
        *slot = value;
    }

    /// Capture the current values for one operation.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            api_url: self.api_url.clone(),
            storage: StorageSnapshot {
                endpoint: self.endpoint.clone(),
                bucket: self.bucket.clone(),
                access_key: self.access_key.clone(),
                secret_key: self.secret_key.clone(),
            },
        }
    }
}

impl fmt::Display for ConfigForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unset(value: &str) -> &str {
            if value.is_empty() {
                "(unset)"
            } else {
                value
            }
        }

        writeln!(f, "api-url:    {}", or_unset(&self.api_url))?;
        writeln!(f, "endpoint:   {}", or_unset(&self.endpoint))?;
        writeln!(f, "bucket:     {}", or_unset(&self.bucket))?;
        writeln!(f, "access-key: {}", or_unset(&self.access_key))?;
        let secret = if self.secret_key.is_empty() {
            "(unset)"
        } else {
            "********"
        };
        write!(f, "secret-key: {}", secret)
    }
}
