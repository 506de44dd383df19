//! JSON export and import of the whole knowledge base.
//!
//! Export captures categories, topics, and relations. Import replays them into
//! another database: categories are matched by name, topics already present under
//! the same `(slug, category)` are skipped, ids are remapped, and relations are
//! re-created through the normal edge upsert. Detection does not run on import.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::categories::find_or_create_category;
use super::relations::{list_relations, upsert_edge};
use super::types::{Category, Relation, Topic, TOPIC_COLUMNS};

/// Version of the export document layout.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Export document: every category, topic and relation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default = "default_format")]
    pub format_version: u32,
    #[serde(default)]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

fn default_format() -> u32 {
    EXPORT_FORMAT_VERSION
}

/// Collect everything in the database.
pub fn export_knowledge(conn: &Connection) -> Result<ExportData> {
    let mut stmt = conn.prepare(
        "SELECT id, name, slug, description, created_at FROM categories ORDER BY id",
    )?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(&format!("SELECT {TOPIC_COLUMNS} FROM topics ORDER BY id"))?;
    let topics = stmt
        .query_map([], Topic::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let relations = list_relations(conn)?;

    Ok(ExportData {
        format_version: EXPORT_FORMAT_VERSION,
        exported_at: Some(super::now()),
        categories,
        topics,
        relations,
    })
}

/// Counts reported by [`import_knowledge`].
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub topics_imported: u64,
    pub topics_skipped: u64,
    pub relations_created: u64,
    pub relations_skipped: u64,
}

/// Replay an export into `conn` inside a single transaction.
pub fn import_knowledge(conn: &mut Connection, data: &ExportData) -> Result<ImportReport> {
    let tx = conn.transaction()?;
    let mut report = ImportReport::default();

    let mut category_ids: HashMap<i64, i64> = HashMap::new();
    for category in &data.categories {
        let local = find_or_create_category(&tx, &category.name, category.description.as_deref())?;
        category_ids.insert(category.id, local.id);
    }

    let mut topic_ids: HashMap<i64, i64> = HashMap::new();
    for topic in &data.topics {
        let category_id = match topic.category_id {
            Some(old) => match category_ids.get(&old) {
                Some(id) => Some(*id),
                None => {
                    tracing::warn!(topic = %topic.name, category_id = old, "topic references unknown category; importing uncategorized");
                    None
                }
            },
            None => None,
        };

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM topics WHERE slug = ?1 AND category_id IS ?2",
                params![topic.slug, category_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            topic_ids.insert(topic.id, id);
            report.topics_skipped += 1;
            continue;
        }

        tx.execute(
            "INSERT INTO topics (name, slug, category_id, content, content_type, is_active, version, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                topic.name,
                topic.slug,
                category_id,
                topic.content,
                topic.content_type.as_str(),
                topic.is_active,
                topic.version,
                topic.created_at,
                topic.updated_at,
            ],
        )?;
        topic_ids.insert(topic.id, tx.last_insert_rowid());
        report.topics_imported += 1;
    }

    for rel in &data.relations {
        let endpoints = (topic_ids.get(&rel.source_id), topic_ids.get(&rel.target_id));
        match endpoints {
            (Some(&source), Some(&target))
                if source != target && (0.0..=1.0).contains(&rel.strength) =>
            {
                upsert_edge(&tx, source, target, &rel.relation_type, rel.strength)?;
                report.relations_created += 1;
            }
            _ => report.relations_skipped += 1,
        }
    }

    tx.commit()?;

    tracing::info!(
        topics_imported = report.topics_imported,
        topics_skipped = report.topics_skipped,
        relations_created = report.relations_created,
        "import complete"
    );
    Ok(report)
}
