#![allow(dead_code)]

use rusqlite::{params, Connection, OptionalExtension};
use scriptorium::db;
use scriptorium::knowledge::references::ReferenceDetector;
use scriptorium::knowledge::topics::{write_topic, TopicWrite, WriteTopicResult};
use scriptorium::knowledge::types::ContentType;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Write a markdown topic with detection on. Panics on failure.
pub fn write(
    conn: &mut Connection,
    name: &str,
    category: Option<&str>,
    content: &str,
) -> WriteTopicResult {
    try_write(conn, name, category, content, true).unwrap()
}

/// Write a markdown topic with detection switched off.
pub fn write_quiet(conn: &mut Connection, name: &str, content: &str) -> WriteTopicResult {
    try_write(conn, name, None, content, false).unwrap()
}

pub fn try_write(
    conn: &mut Connection,
    name: &str,
    category: Option<&str>,
    content: &str,
    detect_references: bool,
) -> anyhow::Result<WriteTopicResult> {
    write_topic(
        conn,
        &TopicWrite {
            name,
            category,
            content,
            content_type: ContentType::Markdown,
            detect_references,
        },
        &ReferenceDetector::default(),
    )
}

/// Strength of the edge `(source, target, relation_type)`, if present.
pub fn edge_strength(conn: &Connection, source: i64, target: i64, relation_type: &str) -> Option<f64> {
    conn.query_row(
        "SELECT strength FROM relations WHERE source_id = ?1 AND target_id = ?2 AND relation_type = ?3",
        params![source, target, relation_type],
        |row| row.get(0),
    )
    .optional()
    .unwrap()
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}
