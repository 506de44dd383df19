use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteTopicParams {
    #[schemars(description = "Topic name. Writing an existing name in the same category replaces its content.")]
    pub name: String,

    #[schemars(description = "The topic's content body")]
    pub content: String,

    #[schemars(description = "Optional category name; created on first use")]
    pub category: Option<String>,

    #[schemars(
        description = "Content type: 'markdown' (default), 'text', 'code', 'json', or 'html'"
    )]
    pub content_type: Option<String>,

    #[schemars(
        description = "Scan the content for mentions of other topics and link them. Defaults to true."
    )]
    pub detect_references: Option<bool>,
}
