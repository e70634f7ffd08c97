use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Recipe;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRecipeRequest {
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "at least one ingredient is required"))]
    pub ingredients: Vec<String>,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub instructions: String,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub category: String,
    #[validate(range(min = 0, max = 1440))]
    pub prep_minutes: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RecipeList {
    #[schema(value_type = Vec<Recipe>)]
    pub items: Vec<Recipe>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendingRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub favorite_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TrendingRecipeList {
    #[schema(value_type = Vec<TrendingRecipe>)]
    pub items: Vec<TrendingRecipe>,
}
