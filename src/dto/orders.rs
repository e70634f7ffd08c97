use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{models::Order, order_status::OrderStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, max = 100, message = "quantity must be between 1 and 100"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "order has no items"), nested)]
    pub items: Vec<OrderLineRequest>,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 120))]
    pub customer_name: String,
    #[validate(custom(function = "crate::dto::not_blank"), length(max = 40))]
    pub customer_phone: String,
    /// Free-text address. Ignored when `address_id` is given.
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    /// One of the caller's saved addresses.
    pub address_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummary {
    pub total_orders: i64,
    pub active_orders: i64,
    pub by_status: Vec<StatusCount>,
    /// Sum of the totals of every order that was not cancelled.
    pub revenue: i64,
}
