// ABOUTME: Serde data models for saved documents in the response store
// ABOUTME: Tolerant parsing with optional fields and opaque string/number ids

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_SOURCE_LABEL: &str = "Unknown Tool";

/// Primary key of a stored document. The backend may hand out numeric or
/// uuid keys, so the value is kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => DocumentId(s),
            Raw::Number(n) => DocumentId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "page_slug")]
    pub source_label: Option<String>,
    #[serde(default, rename = "response_content")]
    pub content: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_TITLE,
        }
    }

    pub fn display_source(&self) -> &str {
        match self.source_label.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SOURCE_LABEL,
        }
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Applies a confirmed update to the in-memory record.
    pub fn apply(&mut self, patch: &DocumentPatch) {
        self.content = Some(patch.content.clone());
        self.title = Some(patch.title.clone());
        self.updated_at = Some(patch.updated_at);
    }
}

/// Field set written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(rename = "response_content")]
    pub content: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}
