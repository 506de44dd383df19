//! MCP `related_topics` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `related_topics` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RelatedTopicsParams {
    #[schemars(description = "Topic id, name, or slug")]
    pub topic: String,

    #[schemars(description = "Only follow edges of this relation type")]
    pub relation_type: Option<String>,

    #[schemars(description = "'outgoing', 'incoming', or 'both' (default)")]
    pub direction: Option<String>,

    #[schemars(description = "Ignore edges weaker than this (0.0-1.0). Defaults to 0.0.")]
    pub min_strength: Option<f64>,
}
