use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetTopicActiveParams {
    #[schemars(description = "Topic id, name, or slug")]
    pub topic: String,

    #[schemars(description = "true to activate, false to deactivate")]
    pub active: bool,
}
