//! Topic categories.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::types::Category;
use super::{now, slugify, KnowledgeError};

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Look up a category by name or slug.
pub fn find_category(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name, slug, description, created_at FROM categories \
             WHERE slug = ?1 OR name = ?2 COLLATE NOCASE LIMIT 1",
            params![slugify(name), name.trim()],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

/// Look up a category by id.
pub fn get_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name, slug, description, created_at FROM categories WHERE id = ?1",
            params![id],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

/// Return the category with this name, creating it if needed.
///
/// An existing category keeps its description; `description` only applies on create.
pub fn find_or_create_category(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<Category> {
    if let Some(existing) = find_category(conn, name)? {
        return Ok(existing);
    }

    let name = name.trim();
    let slug = slugify(name);
    if slug.is_empty() {
        bail!(KnowledgeError::InvalidName(name.to_string()));
    }

    let created_at = now();
    conn.execute(
        "INSERT INTO categories (name, slug, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, slug, description, created_at],
    )?;
    tracing::info!(category = %name, "category created");

    Ok(Category {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        slug,
        description: description.map(str::to_string),
        created_at,
    })
}

/// Result returned from [`create_category`].
#[derive(Debug, Serialize)]
pub struct CreateCategoryResult {
    pub category: Category,
    /// `true` if a category with this name or slug already existed.
    pub existed: bool,
}

/// Create a category explicitly. Idempotent on name/slug.
pub fn create_category(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<CreateCategoryResult> {
    let existed = find_category(conn, name)?.is_some();
    let category = find_or_create_category(conn, name, description)?;
    Ok(CreateCategoryResult { category, existed })
}

/// Category with the number of topics filed under it.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub topic_count: u64,
}

/// All categories alphabetically, with topic counts.
pub fn list_categories(conn: &Connection) -> Result<Vec<CategorySummary>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.slug, c.description, c.created_at, COUNT(t.id) \
         FROM categories c LEFT JOIN topics t ON t.category_id = c.id \
         GROUP BY c.id ORDER BY c.name COLLATE NOCASE",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let count: i64 = row.get(5)?;
            Ok(CategorySummary {
                category: category_from_row(row)?,
                topic_count: count as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Resolve a category name to its id, failing if it does not exist.
pub fn require_category_id(conn: &Connection, name: &str) -> Result<i64> {
    match find_category(conn, name)? {
        Some(c) => Ok(c.id),
        None => bail!(KnowledgeError::CategoryNotFound(name.to_string())),
    }
}
