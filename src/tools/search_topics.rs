//! MCP `search_topics` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_topics` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTopicsParams {
    /// Substring matched case-insensitively against names and content.
    #[schemars(description = "Text to look for in topic names and content")]
    pub query: String,

    #[schemars(description = "Include inactive topics. Defaults to false.")]
    pub include_inactive: Option<bool>,

    #[schemars(description = "Maximum number of results (default 20, max 100)")]
    pub limit: Option<usize>,
}
