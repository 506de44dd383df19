use anyhow::Result;

use crate::config::ScriptoriumConfig;

/// Display knowledge-base statistics in the terminal.
pub fn stats(config: &ScriptoriumConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = crate::knowledge::stats::kb_stats(&conn, Some(db_path.as_path()))?;

    println!("Knowledge Base Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total topics:        {}", response.total_topics);
    println!("  Active:              {}", response.active_topics);
    println!("  Inactive:            {}", response.inactive_topics);
    println!("  Categories:          {}", response.categories);
    println!();

    if !response.by_category.is_empty() {
        println!("By Category:");
        for (name, count) in &response.by_category {
            println!("  {:<24} {}", name, count);
        }
        println!();
    }

    println!("By Content Type:");
    for ct in &["markdown", "text", "code", "json", "html"] {
        let count = response.by_content_type.get(*ct).copied().unwrap_or(0);
        println!("  {:<12} {}", ct, count);
    }
    println!();

    println!("Relations:             {}", response.total_relations);
    for (kind, count) in &response.by_relation_type {
        println!("  {:<20} {}", kind, count);
    }
    println!("History entries:       {}", response.history_entries);
    println!("Database size:         {} bytes", response.db_size_bytes);

    if let Some(ref oldest) = response.oldest_topic {
        println!("Oldest topic:          {oldest}");
    }
    if let Some(ref newest) = response.newest_topic {
        println!("Newest topic:          {newest}");
    }

    Ok(())
}
