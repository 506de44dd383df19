//! MCP history tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `topic_history` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TopicHistoryParams {
    #[schemars(description = "Topic id, name, or slug")]
    pub topic: String,

    /// When set, return just this version with its full content.
    #[schemars(description = "Fetch a single prior version instead of the list")]
    pub version: Option<i64>,

    #[schemars(description = "Maximum number of versions to list (default 20, max 100)")]
    pub limit: Option<usize>,
}

/// Parameters for the `restore_version` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RestoreVersionParams {
    #[schemars(description = "Topic id, name, or slug")]
    pub topic: String,

    #[schemars(description = "Version number to restore")]
    pub version: i64,

    #[schemars(
        description = "Re-run cross-reference detection on the restored content. Defaults to true."
    )]
    pub detect_references: Option<bool>,
}
