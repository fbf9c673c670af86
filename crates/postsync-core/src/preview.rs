//! Markdown preview projection.
//!
//! Rendering is left to whatever view consumes [`RenderableMarkdown`]; this
//! only prepares the payload and never fails.

use serde::Serialize;

/// Markdown dialect the renderer should enable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtensionSet {
    CommonMark,
    /// GitHub Flavored Markdown with web extensions (tables, task lists, autolinks, emoji)
    #[default]
    GitHubWeb,
}

/// Render-ready Markdown handed to the preview view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableMarkdown {
    /// Source text with line endings normalized to `\n`
    pub source: String,
    pub extension_set: ExtensionSet,
    pub selectable: bool,
}

/// Project raw editor text with the default dialect.
pub fn project(raw: &str) -> RenderableMarkdown {
    project_with(raw, ExtensionSet::default())
}

pub fn project_with(raw: &str, extension_set: ExtensionSet) -> RenderableMarkdown {
    RenderableMarkdown {
        source: normalize_line_endings(raw),
        extension_set,
        selectable: true,
    }
}

fn normalize_line_endings(raw: &str) -> String {
    if !raw.contains('\r') {
        return raw.to_string();
    }
    raw.replace("\r\n", "\n").replace('\r', "\n")
}
