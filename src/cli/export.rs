use anyhow::Result;

use crate::config::ScriptoriumConfig;
use crate::knowledge::transfer::export_knowledge;

/// Export all categories, topics, and relations as JSON to stdout.
pub fn export(config: &ScriptoriumConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let data = export_knowledge(&conn)?;

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} categories, {} topics and {} relations.",
        data.categories.len(),
        data.topics.len(),
        data.relations.len()
    );

    Ok(())
}
