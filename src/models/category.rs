use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Category entity used to classify transactions by name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// Request payload for creating or renaming a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "name": "rent" }))]
pub struct CategoryRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}
