use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTopicsParams {
    #[schemars(description = "Only list topics in this category (name or slug)")]
    pub category: Option<String>,

    #[schemars(description = "Include inactive topics. Defaults to false.")]
    pub include_inactive: Option<bool>,

    #[schemars(description = "Maximum number of topics to return (default 20, max 100)")]
    pub limit: Option<usize>,

    #[schemars(description = "Number of topics to skip, for paging")]
    pub offset: Option<usize>,
}
