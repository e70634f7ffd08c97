use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        addresses::Model as AddressModel, favorite_menu_items::Model as FavoriteMenuItemModel,
        favorite_recipes::Model as FavoriteRecipeModel, menu_items::Model as MenuItemModel,
        order_items::Model as OrderItemModel, orders::Model as OrderModel,
        recipes::Model as RecipeModel, reviews::Model as ReviewModel, users::Model as UserModel,
    },
    error::{AppError, AppResult},
    order_status::{OrderStatus, TransitionPolicy},
};

pub const ROLE_USER: &str = "user";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub stock: i32,
    pub is_available: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MenuItemModel> for MenuItem {
    fn from(model: MenuItemModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            price: model.price,
            stock: model.stock,
            is_available: model.is_available,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub category: String,
    pub prep_minutes: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecipeModel> for Recipe {
    fn from(model: RecipeModel) -> Self {
        // Rows written by older clients may hold something other than a string array.
        let ingredients = serde_json::from_value(model.ingredients).unwrap_or_default();
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            ingredients,
            instructions: model.instructions,
            category: model.category,
            prep_minutes: model.prep_minutes,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            menu_item_id: model.menu_item_id,
            name: model.name,
            quantity: model.quantity,
            unit_price: model.unit_price,
            line_total: i64::from(model.quantity) * model.unit_price,
        }
    }
}

/// Sum of quantity × unit price. Totals are always derived, never stored.
pub fn order_total(items: &[OrderItem]) -> i64 {
    items
        .iter()
        .map(|item| i64::from(item.quantity) * item.unit_price)
        .sum()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub status: OrderStatus,
    pub progress_step: Option<u8>,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: i64,
    /// Until when the customer may cancel; `None` once that is no longer possible.
    pub cancellable_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_parts(
        model: OrderModel,
        items: Vec<OrderItemModel>,
        policy: &TransitionPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let status = parse_stored_status(&model.status)?;
        let items: Vec<OrderItem> = items.into_iter().map(OrderItem::from).collect();
        let created_at = model.created_at.with_timezone(&Utc);
        let cancellable_until = policy
            .owner_can_cancel(status, created_at, now)
            .then(|| policy.cancel_deadline(created_at));
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            user_email: model.user_email,
            status,
            progress_step: status.progress_step(),
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            delivery_address: model.delivery_address,
            notes: model.notes,
            total: order_total(&items),
            items,
            cancellable_until,
            created_at,
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

pub fn parse_stored_status(raw: &str) -> AppResult<OrderStatus> {
    raw.parse::<OrderStatus>()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("unknown stored order status {raw:?}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AddressLabel {
    Home,
    Work,
    Other,
}

impl AddressLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressLabel::Home => "home",
            AddressLabel::Work => "work",
            AddressLabel::Other => "other",
        }
    }
}

impl fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(AddressLabel::Home),
            "work" => Ok(AddressLabel::Work),
            "other" => Ok(AddressLabel::Other),
            other => Err(AppError::BadRequest(format!("Invalid address label: {other}"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub label: AddressLabel,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub instructions: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Single-line form copied onto orders.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        parts.push(self.postal_code.as_str());
        parts.join(", ")
    }
}

impl From<AddressModel> for Address {
    fn from(model: AddressModel) -> Self {
        Self {
            id: model.id,
            label: model.label.parse().unwrap_or(AddressLabel::Other),
            full_name: model.full_name,
            phone: model.phone,
            line1: model.line1,
            line2: model.line2,
            city: model.city,
            postal_code: model.postal_code,
            instructions: model.instructions,
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<Uuid>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            order_id: model.order_id,
            menu_item_id: model.menu_item_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteRecipe {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteRecipeModel> for FavoriteRecipe {
    fn from(model: FavoriteRecipeModel) -> Self {
        Self {
            id: model.id,
            recipe_id: model.recipe_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteMenuItem {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteMenuItemModel> for FavoriteMenuItem {
    fn from(model: FavoriteMenuItemModel) -> Self {
        Self {
            id: model.id,
            menu_item_id: model.menu_item_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: i64) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            menu_item_id: Uuid::new_v4(),
            name: "Dish".into(),
            quantity,
            unit_price,
            line_total: i64::from(quantity) * unit_price,
        }
    }

    #[test]
    fn total_sums_quantity_times_price() {
        assert_eq!(order_total(&[item(2, 450), item(1, 1200)]), 2100);
        assert_eq!(order_total(&[]), 0);
    }

    #[test]
    fn address_labels_parse_loosely() {
        assert_eq!("Home".parse::<AddressLabel>().unwrap(), AddressLabel::Home);
        assert_eq!(" work ".parse::<AddressLabel>().unwrap(), AddressLabel::Work);
        assert!("cabin".parse::<AddressLabel>().is_err());
    }

    #[test]
    fn stored_status_must_be_known() {
        assert_eq!(parse_stored_status("Ready").unwrap(), OrderStatus::Ready);
        assert!(matches!(
            parse_stored_status("shipped"),
            Err(AppError::Internal(_))
        ));
    }
}
