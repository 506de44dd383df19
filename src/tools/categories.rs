//! MCP category tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `create_category` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCategoryParams {
    #[schemars(description = "Category name; must be unique")]
    pub name: String,

    #[schemars(description = "Optional description")]
    pub description: Option<String>,
}

/// Parameters for the `list_categories` MCP tool. Takes no arguments.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {}
