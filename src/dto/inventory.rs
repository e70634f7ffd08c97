use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct InventoryStats {
    pub total_items: i64,
    pub available_items: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub total_units: i64,
    pub inventory_value: i64,
    #[sqlx(skip)]
    pub low_stock_threshold: i32,
}
