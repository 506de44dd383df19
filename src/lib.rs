//! Knowledge base for AI agents: topics, version history, and a weighted topic graph via MCP.
//!
//! Scriptorium is an [MCP](https://modelcontextprotocol.io/) server that stores named
//! topics (optionally grouped into categories), snapshots every content replacement
//! into history, and keeps a directed, weighted graph between topics.
//!
//! The graph is fed two ways. Callers may store relations explicitly, and every
//! content write scans the new content for mentions of other topics:
//!
//! | Pass | Matches | Confidence |
//! |------|---------|------------|
//! | **Link** | Markdown link label equal to a topic name | 1.0 |
//! | **Exact** | Word-bounded, case-insensitive name | 0.9 |
//! | **Fuzzy** | Name with arbitrary whitespace between its letters | 0.7 |
//!
//! Each mention becomes a `references` edge at its confidence and a `referenced_by`
//! edge back at 70% of it, all inside the same transaction as the content write.
//!
//! # Architecture
//!
//! - **Storage**: SQLite via rusqlite, WAL mode, forward-only migrations
//! - **Detection**: pure, synchronous scanner over a per-write snapshot of topic names
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`knowledge`]: topics, categories, history, reference detection, relations, stats, import/export

pub mod config;
pub mod db;
pub mod knowledge;
