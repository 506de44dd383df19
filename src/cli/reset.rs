//! CLI `reset` command: delete all knowledge after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use crate::config::ScriptoriumConfig;

/// Delete all topics, categories, history, and relations after user confirmation.
pub fn reset(config: &ScriptoriumConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete ALL topics, categories, history, and relations.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let conn = crate::db::open_database(&db_path)?;

    // Children first for FK constraints
    conn.execute_batch(
        "BEGIN;
         DELETE FROM relations;
         DELETE FROM topic_history;
         DELETE FROM topics;
         DELETE FROM categories;
         COMMIT;",
    )?;

    tracing::info!(db = %db_path.display(), "knowledge base reset");
    println!("All knowledge deleted. Database reset complete.");
    Ok(())
}
