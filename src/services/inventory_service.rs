use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit::record,
    dto::{
        inventory::{InventoryAdjustRequest, InventoryStats},
        menu_items::MenuItemList,
    },
    entity::menu_items::{ActiveModel as MenuItemActive, Column as MenuCol, Entity as MenuItems},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::MenuItem,
    response::{ApiResponse, Meta},
    routes::params::LowStockQuery,
    state::AppState,
};

pub async fn inventory_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InventoryStats>> {
    ensure_staff(user)?;
    let threshold = state.config.low_stock_threshold;

    let mut stats = sqlx::query_as::<_, InventoryStats>(
        r#"
        SELECT
            COUNT(*) AS total_items,
            COUNT(*) FILTER (WHERE is_available) AS available_items,
            COUNT(*) FILTER (WHERE stock > 0 AND stock <= $1) AS low_stock_items,
            COUNT(*) FILTER (WHERE stock = 0) AS out_of_stock_items,
            COALESCE(SUM(stock), 0)::BIGINT AS total_units,
            COALESCE(SUM(price * stock), 0)::BIGINT AS inventory_value
        FROM menu_items
        "#,
    )
    .bind(threshold)
    .fetch_one(&state.pool)
    .await?;
    stats.low_stock_threshold = threshold;

    Ok(ApiResponse::success(
        "Inventory stats",
        stats,
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<MenuItemList>> {
    ensure_staff(user)?;
    let threshold = query.threshold.unwrap_or(state.config.low_stock_threshold);
    let (page, limit, offset) = query.pagination().normalize();

    // Same definition as the stats: sold-out items are counted separately.
    let finder = MenuItems::find()
        .filter(MenuCol::Stock.gt(0))
        .filter(MenuCol::Stock.lte(threshold))
        .order_by_asc(MenuCol::Stock)
        .order_by_asc(MenuCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", MenuItemList { items }, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let item = MenuItems::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_stock = item
        .stock
        .checked_add(payload.delta)
        .filter(|stock| *stock >= 0)
        .ok_or_else(|| AppError::BadRequest("stock cannot be negative".into()))?;

    let mut active: MenuItemActive = item.into();
    active.stock = Set(new_stock);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(menu_item_id = %updated.id, delta = payload.delta, stock = new_stock, "inventory adjusted");
    record(
        &state.pool,
        user.user_id,
        "inventory_adjust",
        "menu_items",
        serde_json::json!({ "menu_item_id": updated.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        MenuItem::from(updated),
        Some(Meta::empty()),
    ))
}
