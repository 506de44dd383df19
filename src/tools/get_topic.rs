//! MCP `get_topic` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `get_topic` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetTopicParams {
    #[schemars(description = "Topic id, name, or slug")]
    pub topic: String,

    #[schemars(description = "Include related topics in the response. Defaults to false.")]
    pub include_related: Option<bool>,
}
