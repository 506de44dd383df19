use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Response from kb_stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_topics: u64,
    pub active_topics: u64,
    pub inactive_topics: u64,
    pub categories: u64,
    pub by_category: BTreeMap<String, u64>,
    pub by_content_type: BTreeMap<String, u64>,
    pub total_relations: u64,
    pub by_relation_type: BTreeMap<String, u64>,
    pub history_entries: u64,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_topic: Option<String>,
}

/// Label used for topics without a category.
pub const UNCATEGORIZED: &str = "(uncategorized)";

/// Compute knowledge-base statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory databases.
pub fn kb_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse> {
    let (total, active) = count_topics(conn)?;
    let categories = scalar(conn, "SELECT COUNT(*) FROM categories")?;
    let by_category = grouped(
        conn,
        &format!(
            "SELECT COALESCE(c.name, '{UNCATEGORIZED}'), COUNT(*) \
             FROM topics t LEFT JOIN categories c ON c.id = t.category_id GROUP BY 1"
        ),
    )?;
    let by_content_type = grouped(
        conn,
        "SELECT content_type, COUNT(*) FROM topics GROUP BY content_type",
    )?;
    let total_relations = scalar(conn, "SELECT COUNT(*) FROM relations")?;
    let by_relation_type = grouped(
        conn,
        "SELECT relation_type, COUNT(*) FROM relations GROUP BY relation_type",
    )?;
    let history_entries = scalar(conn, "SELECT COUNT(*) FROM topic_history")?;
    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM topics",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        total_topics: total,
        active_topics: active,
        inactive_topics: total - active,
        categories,
        by_category,
        by_content_type,
        total_relations,
        by_relation_type,
        history_entries,
        db_size_bytes,
        oldest_topic: oldest,
        newest_topic: newest,
    })
}

/// Total and active topic counts.
fn count_topics(conn: &Connection) -> Result<(u64, u64)> {
    let total = scalar(conn, "SELECT COUNT(*) FROM topics")?;
    let active = scalar(conn, "SELECT COUNT(*) FROM topics WHERE is_active = 1")?;
    Ok((total, active))
}

fn scalar(conn: &Connection, sql: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

fn grouped(conn: &Connection, sql: &str) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(|(k, n)| (k, n as u64)).collect())
}
