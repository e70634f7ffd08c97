use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::MenuItem;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMenuItemRequest {
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 120))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub category: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateMenuItemRequest {
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuItemList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}
