use anyhow::{Context, Result};
use std::path::Path;

use crate::config::ScriptoriumConfig;
use crate::knowledge::transfer::{import_knowledge, ExportData, EXPORT_FORMAT_VERSION};

/// Import categories, topics, and relations from a JSON export.
///
/// Topics whose `(slug, category)` already exist are skipped. Relations are
/// re-created when both endpoints end up in the database.
pub fn import(config: &ScriptoriumConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    if data.format_version > EXPORT_FORMAT_VERSION {
        anyhow::bail!(
            "export format version {} is newer than supported version {}",
            data.format_version,
            EXPORT_FORMAT_VERSION
        );
    }

    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    println!(
        "Importing {} topics and {} relations...",
        data.topics.len(),
        data.relations.len()
    );

    let report = import_knowledge(&mut conn, &data)?;

    println!("Import complete:");
    println!("  Topics imported:   {}", report.topics_imported);
    println!("  Topics skipped:    {} (already exist)", report.topics_skipped);
    println!("  Relations created: {}", report.relations_created);
    if report.relations_skipped > 0 {
        println!("  Relations skipped: {}", report.relations_skipped);
    }

    Ok(())
}
