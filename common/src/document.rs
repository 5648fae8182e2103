use std::path::Path;

use serde::{Deserialize, Serialize};

/// A named, typed text buffer, independent of how it is displayed.
///
/// Serialized with the wire names the generation service uses for its
/// file entries: `{ "name", "contents", "contentType" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(rename = "contents", default)]
    pub content: String,
    #[serde(rename = "contentType", default)]
    pub content_type: String,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// Builds a document whose content type is derived from the file name,
    /// e.g. `query.sql` -> `text/x-sql`.
    pub fn for_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name);
        Self {
            name,
            content: content.into(),
            content_type,
        }
    }

    /// The blank document an editor shows when no tab is selected.
    pub fn blank() -> Self {
        Self::new("", "", "text/plain")
    }

    pub fn matches_suffix(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.name.ends_with(suffix)
    }
}

/// Maps a file name to the editor mode tag used for syntax highlighting.
pub fn content_type_for(name: &str) -> String {
    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("text/x-{}", ext),
        _ => "text/plain".to_string(),
    }
}
