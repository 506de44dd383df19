//! Core record types.
//!
//! Defines [`ContentType`] (the content tag stored with each topic) and the typed
//! rows built at the storage boundary: [`Topic`], [`Category`], [`Relation`], and
//! [`HistoryEntry`].

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::KnowledgeError;

/// Format tag for a topic's content body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Markdown,
    Text,
    Code,
    Json,
    Html,
}

impl ContentType {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Text => "text",
            Self::Code => "code",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "plain" => Ok(Self::Text),
            "code" => Ok(Self::Code),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            _ => Err(KnowledgeError::InvalidContentType(s.to_string())),
        }
    }
}

/// A topic record, matching the `topics` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    /// Display name as last written.
    pub name: String,
    /// URL-safe key derived from the name; unique within a category.
    pub slug: String,
    pub category_id: Option<i64>,
    pub content: String,
    pub content_type: ContentType,
    pub is_active: bool,
    /// Starts at 1 and increments on every content replacement.
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Column list matching [`Topic::from_row`].
pub(crate) const TOPIC_COLUMNS: &str =
    "id, name, slug, category_id, content, content_type, is_active, version, created_at, updated_at";

impl Topic {
    /// Build a topic from a row selected with [`TOPIC_COLUMNS`].
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let content_type: String = row.get(5)?;
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            category_id: row.get(3)?,
            content: row.get(4)?,
            content_type: content_type
                .parse()
                .map_err(|_| rusqlite::Error::InvalidQuery)?,
            is_active: row.get(6)?,
            version: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// A directed, typed, weighted edge between two topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub source_id: i64,
    pub target_id: i64,
    /// Edge label, e.g. `"references"`, `"referenced_by"`, `"depends_on"`.
    pub relation_type: String,
    /// Weight in `[0.0, 1.0]`.
    pub strength: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Snapshot of a topic's content as it was before a write replaced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub topic_id: i64,
    pub version: i64,
    pub name: String,
    pub content: String,
    pub content_type: ContentType,
    /// When the snapshot was taken.
    pub created_at: String,
}
