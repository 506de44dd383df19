//! CLI `inspect` command: display a topic with its history and relations.

use anyhow::Result;

use crate::config::ScriptoriumConfig;
use crate::knowledge::categories::get_category;
use crate::knowledge::relations::{related_topics, Direction};
use crate::knowledge::{history, topics};

const HISTORY_SHOWN: usize = 10;

/// Inspect a single topic by id, name, or slug and display full details.
pub fn inspect(config: &ScriptoriumConfig, key: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let t = topics::find_topic(&conn, key)?;
    let category = match t.category_id {
        Some(id) => get_category(&conn, id)?.map(|c| c.name),
        None => None,
    };

    println!("Topic: {} (#{})", t.name, t.id);
    println!("{}", "=".repeat(50));
    println!("  Slug:           {}", t.slug);
    println!("  Category:       {}", category.as_deref().unwrap_or("(none)"));
    println!("  Content type:   {}", t.content_type);
    println!("  Active:         {}", if t.is_active { "yes" } else { "no" });
    println!("  Version:        {}", t.version);
    println!("  Created:        {}", t.created_at);
    println!("  Updated:        {}", t.updated_at);
    println!();
    println!("Content:");
    for line in t.content.lines() {
        println!("  {line}");
    }

    let related = related_topics(&conn, t.id, None, Direction::Both, 0.0)?;
    if !related.is_empty() {
        println!();
        println!("Relations:");
        for rel in &related {
            let arrow = if rel.direction == "outgoing" { "-->" } else { "<--" };
            println!(
                "  {arrow} [{}] {} (#{}) {:.2}",
                rel.relation_type, rel.name, rel.topic_id, rel.strength
            );
        }
    }

    let entries = history::list_history(&conn, t.id, HISTORY_SHOWN)?;
    if !entries.is_empty() {
        println!();
        println!("History:");
        for entry in &entries {
            println!(
                "  v{:<4} {} {} ({} chars)",
                entry.version,
                entry.created_at,
                entry.name,
                entry.content.chars().count()
            );
        }
    }

    Ok(())
}
