use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `detect_references` MCP tool. Nothing is written.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DetectReferencesParams {
    #[schemars(description = "Text to scan for mentions of known topics")]
    pub content: String,
}
