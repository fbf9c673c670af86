use std::fmt;
use std::str::FromStr;

use crate::error::SyncError;

/// Integer content id of unbounded size, kept in canonical decimal form.
///
/// Parsing accepts surrounding whitespace, an optional sign, leading zeros
/// and single underscores between digits; the canonical form has none of
/// those (`" +007 "` is `7`, `"-0"` is `0`, `"1_000"` is `1000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ContentId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for ContentId {
    type Err = SyncError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            SyncError::InvalidInput(format!(
                "Invalid content number: '{}' is not an integer",
                text
            ))
        };

        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        if unsigned.is_empty()
            || unsigned.starts_with('_')
            || unsigned.ends_with('_')
            || unsigned.contains("__")
            || !unsigned.chars().all(|c| c.is_ascii_digit() || c == '_')
        {
            return Err(invalid());
        }

        let digits: String = unsigned.chars().filter(|c| *c != '_').collect();
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self("0".to_string()));
        }

        let canonical = if negative {
            format!("-{}", significant)
        } else {
            significant.to_string()
        };
        Ok(Self(canonical))
    }
}
