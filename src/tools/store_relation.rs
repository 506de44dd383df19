//! MCP `store_relation` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `store_relation` MCP tool.
///
/// Creates or re-weights a directed edge between two topics. Idempotent on the
/// (source, target, relation_type) triple.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreRelationParams {
    #[schemars(description = "Source topic: id, name, or slug")]
    pub source: String,

    #[schemars(description = "Target topic: id, name, or slug")]
    pub target: String,

    /// Edge label (e.g. `"depends_on"`, `"see_also"`).
    #[schemars(description = "Relation type (e.g. 'depends_on', 'see_also', 'part_of')")]
    pub relation_type: String,

    #[schemars(description = "Edge strength 0.0-1.0. Defaults to 0.5.")]
    pub strength: Option<f64>,
}
