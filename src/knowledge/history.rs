//! Topic version history.
//!
//! Every content replacement snapshots the outgoing version first, so history
//! holds versions `1..current`. Restoring an old version is itself a content
//! write and produces a new version.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::references::ReferenceDetector;
use super::relations::{cross_reference, AppliedReference};
use super::topics::{get_topic_by_id, replace_content};
use super::types::{ContentType, HistoryEntry, Topic};
use super::{now, KnowledgeError};

/// Record `topic` as it currently stands.
pub(crate) fn snapshot_topic(conn: &Connection, topic: &Topic) -> Result<()> {
    conn.execute(
        "INSERT INTO topic_history (topic_id, version, name, content, content_type, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            topic.id,
            topic.version,
            topic.name,
            topic.content,
            topic.content_type.as_str(),
            now()
        ],
    )?;
    Ok(())
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let content_type: String = row.get(5)?;
    Ok(HistoryEntry {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        version: row.get(2)?,
        name: row.get(3)?,
        content: row.get(4)?,
        content_type: content_type
            .parse::<ContentType>()
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        created_at: row.get(6)?,
    })
}

/// Prior versions of a topic, newest first.
pub fn list_history(conn: &Connection, topic_id: i64, limit: usize) -> Result<Vec<HistoryEntry>> {
    get_topic_by_id(conn, topic_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, topic_id, version, name, content, content_type, created_at \
         FROM topic_history WHERE topic_id = ?1 ORDER BY version DESC LIMIT ?2",
    )?;
    let entries = stmt
        .query_map(params![topic_id, limit as i64], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// A single prior version.
pub fn get_version(conn: &Connection, topic_id: i64, version: i64) -> Result<HistoryEntry> {
    let entry = conn
        .query_row(
            "SELECT id, topic_id, version, name, content, content_type, created_at \
             FROM topic_history WHERE topic_id = ?1 AND version = ?2",
            params![topic_id, version],
            entry_from_row,
        )
        .optional()?;
    match entry {
        Some(e) => Ok(e),
        None => bail!(KnowledgeError::VersionNotFound { topic_id, version }),
    }
}

/// Result returned from [`restore_version`].
#[derive(Debug, Serialize)]
pub struct RestoreResult {
    pub topic_id: i64,
    pub restored_from: i64,
    pub version: i64,
    pub references: Vec<AppliedReference>,
}

/// Bring back the content of `version` as a new version.
///
/// The topic keeps its current name (renaming would change its slug key); only
/// content and content type are restored.
pub fn restore_version(
    conn: &mut Connection,
    topic_id: i64,
    version: i64,
    detect_references: bool,
    detector: &ReferenceDetector,
) -> Result<RestoreResult> {
    let tx = conn.transaction()?;

    let entry = get_version(&tx, topic_id, version)?;
    let new_version = replace_content(&tx, topic_id, None, &entry.content, entry.content_type)?;

    let references = if detect_references {
        let name = get_topic_by_id(&tx, topic_id)?.name;
        cross_reference(&*tx, detector, topic_id, &name, &entry.content)?
    } else {
        Vec::new()
    };

    tx.commit()?;

    tracing::info!(topic_id, restored_from = version, version = new_version, "topic version restored");

    Ok(RestoreResult {
        topic_id,
        restored_from: version,
        version: new_version,
        references,
    })
}
