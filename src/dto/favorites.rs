use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{MenuItem, Recipe};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddFavoriteRecipeRequest {
    pub recipe_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddFavoriteMenuItemRequest {
    pub menu_item_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteRecipeList {
    #[schema(value_type = Vec<Recipe>)]
    pub items: Vec<Recipe>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteMenuItemList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteStatus {
    pub favorite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteRemoved {
    pub removed: bool,
}
