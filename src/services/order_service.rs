use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    audit::record,
    dto::{
        orders::{OrderList, OrderSummary, PlaceOrderRequest, StatusCount, UpdateOrderStatusRequest},
        validated,
    },
    entity::{
        menu_items::{Column as MenuCol, Entity as MenuItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Address, Order},
    order_status::{Actor, OrderStatus, TransitionPolicy},
    receipt::render_receipt,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::address_service,
    state::AppState,
};

fn policy(state: &AppState) -> TransitionPolicy {
    TransitionPolicy::new(state.config.cancel_window_secs)
}

/// Upper bound on the quantity of one menu item in an order, after merging.
pub const MAX_LINE_QUANTITY: i32 = 100;

/// Folds repeated menu items into one line each.
pub fn merge_lines(lines: &[(Uuid, i32)]) -> AppResult<BTreeMap<Uuid, i32>> {
    let mut merged: BTreeMap<Uuid, i32> = BTreeMap::new();
    for (menu_item_id, quantity) in lines {
        let total = merged.entry(*menu_item_id).or_insert(0);
        *total = total
            .checked_add(*quantity)
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "quantity for {menu_item_id} must not exceed {MAX_LINE_QUANTITY}"
                ))
            })?;
    }
    Ok(merged)
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<OrderItemModel>>> {
    let mut grouped: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::Name)
        .all(conn)
        .await?;
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

async fn assemble<C: ConnectionTrait>(
    conn: &C,
    policy: &TransitionPolicy,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<Order>> {
    let now = Utc::now();
    let mut items = load_items(conn, orders.iter().map(|o| o.id).collect()).await?;
    orders
        .into_iter()
        .map(|order| {
            let lines = items.remove(&order.id).unwrap_or_default();
            Order::from_parts(order, lines, policy, now)
        })
        .collect()
}

fn list_condition(query: &OrderListQuery) -> AppResult<Condition> {
    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.trim().is_empty()) {
        let status: OrderStatus = status.parse()?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(scope) = query.scope {
        let statuses: Vec<&str> = scope.statuses().into_iter().map(OrderStatus::as_str).collect();
        condition = condition.add(OrderCol::Status.is_in(statuses));
    }
    Ok(condition)
}

async fn list_orders(
    state: &AppState,
    condition: Condition,
    query: &OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = assemble(&state.orm, &policy(state), orders).await?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = list_condition(&query)?.add(OrderCol::UserId.eq(user.user_id));
    list_orders(state, condition, &query).await
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    let condition = list_condition(&query)?;
    list_orders(state, condition, &query).await
}

/// Customers only see their own orders; anyone else's is reported as missing.
async fn find_visible<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
    lock: bool,
) -> AppResult<OrderModel> {
    let mut finder = Orders::find_by_id(id);
    if !user.is_staff() {
        finder = finder.filter(OrderCol::UserId.eq(user.user_id));
    }
    if lock {
        finder = finder.lock(LockType::Update);
    }
    finder.one(conn).await?.ok_or(AppError::NotFound)
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = find_visible(&state.orm, user, id, false).await?;
    let order = assemble(&state.orm, &policy(state), vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let payload = validated(payload)?;
    let lines: Vec<(Uuid, i32)> = payload
        .items
        .iter()
        .map(|line| (line.menu_item_id, line.quantity))
        .collect();
    let lines = merge_lines(&lines)?;

    let delivery_address = match payload.address_id {
        Some(address_id) => {
            Address::from(address_service::find_owned(&state.orm, user, address_id).await?)
                .one_line()
        }
        None => payload
            .delivery_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("A delivery address is required".into()))?,
    };

    let txn = state.orm.begin().await?;

    let menu: HashMap<Uuid, _> = MenuItems::find()
        .filter(MenuCol::Id.is_in(lines.keys().copied().collect::<Vec<_>>()))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    for (menu_item_id, quantity) in &lines {
        let item = menu.get(menu_item_id).ok_or_else(|| {
            AppError::BadRequest(format!("Menu item {menu_item_id} does not exist"))
        })?;
        if !item.is_available {
            return Err(AppError::BadRequest(format!("{} is not available", item.name)));
        }
        if item.stock < *quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                item.name
            )));
        }
    }

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        user_email: Set(user.email.clone()),
        status: Set(OrderStatus::Placed.as_str().to_string()),
        customer_name: Set(payload.customer_name.trim().to_string()),
        customer_phone: Set(payload.customer_phone.trim().to_string()),
        delivery_address: Set(delivery_address),
        notes: Set(payload
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(lines.len());
    for (menu_item_id, quantity) in &lines {
        let item = &menu[menu_item_id];
        let line = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(item.id),
            name: Set(item.name.clone()),
            quantity: Set(*quantity),
            unit_price: Set(item.price),
        }
        .insert(&txn)
        .await?;
        order_items.push(line);

        MenuItems::update_many()
            .col_expr(MenuCol::Stock, Expr::col(MenuCol::Stock).sub(*quantity))
            .filter(MenuCol::Id.eq(item.id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    let order = Order::from_parts(order, order_items, &policy(state), Utc::now())?;
    tracing::info!(order_id = %order.id, user_id = %user.user_id, total = order.total, "order placed");
    record(
        &state.pool,
        user.user_id,
        "order_placed",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let target: OrderStatus = payload.status.parse()?;
    change_status_at(state, user, id, target, Utc::now()).await
}

/// Applies a status change as of `now`. Cancelling puts the stock back.
pub async fn change_status_at(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    target: OrderStatus,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<Order>> {
    let policy = policy(state);
    let txn = state.orm.begin().await?;

    let existing = find_visible(&txn, user, id, true).await?;
    let current = crate::models::parse_stored_status(&existing.status)?;
    let actor = if user.is_staff() {
        Actor::Staff
    } else {
        Actor::Owner
    };
    policy.check(
        actor,
        current,
        target,
        existing.created_at.with_timezone(&Utc),
        now,
    )?;

    let mut active: OrderActive = existing.into();
    active.status = Set(target.as_str().to_string());
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    if target == OrderStatus::Cancelled {
        for item in &items {
            MenuItems::update_many()
                .col_expr(MenuCol::Stock, Expr::col(MenuCol::Stock).add(item.quantity))
                .filter(MenuCol::Id.eq(item.menu_item_id))
                .exec(&txn)
                .await?;
        }
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %current, to = %target, by = %user.user_id, "order status changed");
    record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": current, "to": target }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from_parts(order, items, &policy, now)?,
        Some(Meta::empty()),
    ))
}

pub async fn order_receipt(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<String> {
    let order = find_visible(&state.orm, user, id, false).await?;
    let order = assemble(&state.orm, &policy(state), vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(render_receipt(&order))
}

pub async fn order_summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderSummary>> {
    ensure_staff(user)?;

    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT o.status,
               COUNT(DISTINCT o.id) AS orders,
               COALESCE(SUM(oi.quantity::BIGINT * oi.unit_price), 0)::BIGINT AS amount
        FROM orders o
        LEFT JOIN order_items oi ON oi.order_id = o.id
        GROUP BY o.status
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Order summary",
        summarize(rows)?,
        Some(Meta::empty()),
    ))
}

/// Builds the summary from `(status, order count, amount)` rows.
pub fn summarize(rows: Vec<(String, i64, i64)>) -> AppResult<OrderSummary> {
    let mut counts: HashMap<OrderStatus, i64> = HashMap::new();
    let mut revenue = 0;
    for (status, orders, amount) in rows {
        let status = crate::models::parse_stored_status(&status)?;
        *counts.entry(status).or_insert(0) += orders;
        if status != OrderStatus::Cancelled {
            revenue += amount;
        }
    }

    let by_status: Vec<StatusCount> = OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: counts.get(&status).copied().unwrap_or(0),
        })
        .collect();

    Ok(OrderSummary {
        total_orders: by_status.iter().map(|c| c.count).sum(),
        active_orders: by_status
            .iter()
            .filter(|c| c.status.is_active())
            .map(|c| c.count)
            .sum(),
        by_status,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_duplicate_lines() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_lines(&[(a, 1), (b, 2), (a, 3)]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&a], 4);
        assert_eq!(merged[&b], 2);
    }

    #[test]
    fn merged_quantity_is_capped() {
        let a = Uuid::new_v4();
        let merged = merge_lines(&[(a, 60), (a, 40)]).unwrap();
        assert_eq!(merged[&a], MAX_LINE_QUANTITY);

        let err = merge_lines(&[(a, 100), (a, 100), (a, 100)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = merge_lines(&[(a, i32::MAX), (a, 1)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn summary_excludes_cancelled_revenue() {
        let summary = summarize(vec![
            ("Placed".into(), 2, 3000),
            ("Completed".into(), 3, 9000),
            ("Cancelled".into(), 1, 1500),
        ])
        .unwrap();
        assert_eq!(summary.total_orders, 6);
        assert_eq!(summary.active_orders, 2);
        assert_eq!(summary.revenue, 12000);
        assert_eq!(summary.by_status.len(), 6);
        let ready = summary
            .by_status
            .iter()
            .find(|c| c.status == OrderStatus::Ready)
            .unwrap();
        assert_eq!(ready.count, 0);
    }

    #[test]
    fn rejects_unknown_status_filter() {
        let query = OrderListQuery {
            status: Some("shipped".into()),
            ..Default::default()
        };
        assert!(matches!(list_condition(&query), Err(AppError::BadRequest(_))));
    }
}
