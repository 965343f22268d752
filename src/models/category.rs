use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Id of the permanent fallback category
pub const GENERAL_CATEGORY_ID: &str = "general";

/// Color assigned when a new category is created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#22c55e";

/// Category grouping concepts; `id` is a slug derived from the name at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    #[schema(example = "agua")]
    pub id: String,
    #[schema(example = "Agua")]
    pub name: String,
    #[schema(example = "#111111")]
    pub color: String,
}

impl Category {
    pub fn is_general(&self) -> bool {
        self.id == GENERAL_CATEGORY_ID
    }
}

/// Request payload for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Agua", "color": "#111111"}))]
pub struct CreateCategoryRequest {
    #[validate(custom(function = "validate_not_blank", message = "name is required"))]
    #[serde(default)]
    pub name: String,

    pub color: Option<String>,
}

/// Request payload for renaming a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Suministros"}))]
pub struct RenameCategoryRequest {
    #[validate(custom(function = "validate_not_blank", message = "name is required"))]
    #[serde(default)]
    pub name: String,
}

/// Response body of `POST /api/categories`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub category: Category,
}
