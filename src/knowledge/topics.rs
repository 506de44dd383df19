//! Topic write path and lookups.
//!
//! [`write_topic`] is the single entry point for content. It runs inside one
//! transaction: resolve (or create) the category, create the topic or snapshot its
//! prior content into history, then refresh the name index, detect mentions, and
//! upsert the resulting edges. Any failure rolls the whole write back.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;

use super::categories::{find_or_create_category, require_category_id};
use super::history::snapshot_topic;
use super::name_index::fold;
use super::references::ReferenceDetector;
use super::relations::{cross_reference, AppliedReference};
use super::types::{ContentType, Topic, TOPIC_COLUMNS};
use super::{now, slugify, KnowledgeError};

/// Input to [`write_topic`].
#[derive(Debug, Clone)]
pub struct TopicWrite<'a> {
    pub name: &'a str,
    /// Category name; created on first use. `None` files the topic uncategorized.
    pub category: Option<&'a str>,
    pub content: &'a str,
    pub content_type: ContentType,
    /// Run cross-reference detection for this write.
    pub detect_references: bool,
}

/// Result returned from a write.
#[derive(Debug, Serialize)]
pub struct WriteTopicResult {
    pub id: i64,
    pub slug: String,
    pub category_id: Option<i64>,
    /// `true` if the topic did not exist before this write.
    pub created: bool,
    pub version: i64,
    /// Edges written by cross-reference detection; empty when detection was off.
    pub references: Vec<AppliedReference>,
}

/// Create or update a topic keyed by `(slug(name), category)`.
///
/// An existing topic is only updated when its name matches case-insensitively;
/// a different name that happens to share the slug is a
/// [`KnowledgeError::NameConflict`].
pub fn write_topic(
    conn: &mut Connection,
    write: &TopicWrite<'_>,
    detector: &ReferenceDetector,
) -> Result<WriteTopicResult> {
    let name = write.name.trim();
    let slug = slugify(name);
    if slug.is_empty() {
        bail!(KnowledgeError::InvalidName(write.name.to_string()));
    }

    let tx = conn.transaction()?;

    let category_id = match write.category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => Some(find_or_create_category(&tx, category, None)?.id),
        None => None,
    };

    let existing: Option<(i64, String)> = tx
        .query_row(
            "SELECT id, name FROM topics WHERE slug = ?1 AND category_id IS ?2",
            params![slug, category_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (id, created, version) = match existing {
        Some((_, existing_name)) if fold(&existing_name) != fold(name) => {
            bail!(KnowledgeError::NameConflict {
                name: name.to_string(),
                existing: existing_name,
                slug,
            });
        }
        Some((id, _)) => {
            let version =
                replace_content(&tx, id, Some(name), write.content, write.content_type)?;
            (id, false, version)
        }
        None => {
            let id = insert_topic(&tx, name, &slug, category_id, write.content, write.content_type)?;
            (id, true, 1)
        }
    };

    let references = if write.detect_references {
        cross_reference(&*tx, detector, id, name, write.content)?
    } else {
        Vec::new()
    };

    tx.commit()?;

    tracing::info!(
        topic_id = id,
        slug = %slug,
        created,
        version,
        references = references.len(),
        "topic written"
    );

    Ok(WriteTopicResult {
        id,
        slug,
        category_id,
        created,
        version,
        references,
    })
}

fn insert_topic(
    tx: &Transaction,
    name: &str,
    slug: &str,
    category_id: Option<i64>,
    content: &str,
    content_type: ContentType,
) -> Result<i64> {
    let now = now();
    tx.execute(
        "INSERT INTO topics (name, slug, category_id, content, content_type, is_active, version, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, ?6, ?6)",
        params![name, slug, category_id, content, content_type.as_str(), now],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Snapshot the current content into history, then overwrite it and bump the
/// version. Returns the new version.
pub(crate) fn replace_content(
    tx: &Transaction,
    topic_id: i64,
    name: Option<&str>,
    content: &str,
    content_type: ContentType,
) -> Result<i64> {
    let current = get_topic_by_id(tx, topic_id)?;
    snapshot_topic(tx, &current)?;

    let version = current.version + 1;
    tx.execute(
        "UPDATE topics SET name = ?1, content = ?2, content_type = ?3, version = ?4, updated_at = ?5 \
         WHERE id = ?6",
        params![
            name.unwrap_or(&current.name),
            content,
            content_type.as_str(),
            version,
            now(),
            topic_id
        ],
    )?;
    Ok(version)
}

/// Fetch a topic by numeric id.
pub fn get_topic_by_id(conn: &Connection, id: i64) -> Result<Topic> {
    let topic = conn
        .query_row(
            &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?1"),
            params![id],
            Topic::from_row,
        )
        .optional()?;
    match topic {
        Some(t) => Ok(t),
        None => bail!(KnowledgeError::TopicNotFound(id.to_string())),
    }
}

/// Fetch a topic by id, slug, or name (case-insensitive).
///
/// Numeric keys are tried as ids first; otherwise an exact name match beats a slug
/// match, and the oldest topic wins among equals.
pub fn find_topic(conn: &Connection, key: &str) -> Result<Topic> {
    let key = key.trim();
    if let Ok(id) = key.parse::<i64>() {
        if let Ok(topic) = get_topic_by_id(conn, id) {
            return Ok(topic);
        }
    }

    let topic = conn
        .query_row(
            &format!(
                "SELECT {TOPIC_COLUMNS} FROM topics \
                 WHERE name = ?1 COLLATE NOCASE OR slug = ?2 \
                 ORDER BY (name = ?1 COLLATE NOCASE) DESC, id ASC LIMIT 1"
            ),
            params![key, slugify(key)],
            Topic::from_row,
        )
        .optional()?;

    match topic {
        Some(t) => Ok(t),
        None => bail!(KnowledgeError::TopicNotFound(key.to_string())),
    }
}

/// Filters for [`list_topics`].
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    /// Category name or slug.
    pub category: Option<String>,
    pub include_inactive: bool,
    pub limit: usize,
    pub offset: usize,
}

/// Compact listing row; content is omitted.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub content_type: String,
    pub is_active: bool,
    pub version: i64,
    pub updated_at: String,
}

const SUMMARY_SELECT: &str = "SELECT t.id, t.name, t.slug, c.name, t.content_type, t.is_active, \
     t.version, t.updated_at FROM topics t LEFT JOIN categories c ON c.id = t.category_id";

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TopicSummary> {
    Ok(TopicSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        category: row.get(3)?,
        content_type: row.get(4)?,
        is_active: row.get(5)?,
        version: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// List topics alphabetically by name.
///
/// Filtering by a category that does not exist is a
/// [`KnowledgeError::CategoryNotFound`] rather than an empty page.
pub fn list_topics(conn: &Connection, filter: &TopicFilter) -> Result<Vec<TopicSummary>> {
    let category_id = match filter.category.as_deref() {
        Some(category) => Some(require_category_id(conn, category)?),
        None => None,
    };
    let sql = format!(
        "{SUMMARY_SELECT} \
         WHERE (?1 IS NULL OR t.category_id = ?1) AND (?2 OR t.is_active = 1) \
         ORDER BY t.name COLLATE NOCASE, t.id LIMIT ?3 OFFSET ?4"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![
                category_id,
                filter.include_inactive,
                filter.limit as i64,
                filter.offset as i64
            ],
            summary_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Case-insensitive substring search over names and content, most recently
/// updated first. Results are filtered, not ranked.
pub fn search_topics(
    conn: &Connection,
    query: &str,
    include_inactive: bool,
    limit: usize,
) -> Result<Vec<TopicSummary>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "{SUMMARY_SELECT} \
         WHERE (t.name LIKE ?1 ESCAPE '\\' OR t.content LIKE ?1 ESCAPE '\\') \
         AND (?2 OR t.is_active = 1) \
         ORDER BY t.updated_at DESC, t.id DESC LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![pattern, include_inactive, limit as i64], summary_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Toggle a topic between active and inactive. Returns the updated topic.
pub fn set_topic_active(conn: &Connection, topic_id: i64, active: bool) -> Result<Topic> {
    let rows = conn.execute(
        "UPDATE topics SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active, now(), topic_id],
    )?;
    if rows == 0 {
        bail!(KnowledgeError::TopicNotFound(topic_id.to_string()));
    }
    tracing::info!(topic_id, active, "topic activity changed");
    get_topic_by_id(conn, topic_id)
}
