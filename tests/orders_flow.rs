use chrono::Duration;
use food_order_api::{
    config::AppConfig,
    db::{create_orm_conn, pool_of},
    dto::{
        inventory::InventoryAdjustRequest,
        orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    entity::{
        AuditLogs, audit_logs,
        menu_items::ActiveModel as MenuItemActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{ROLE_ADMIN, ROLE_STAFF, ROLE_USER},
    order_status::OrderStatus,
    routes::params::{LowStockQuery, MenuItemQuery, OrderListQuery},
    services::{inventory_service, menu_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

// Each test works on its own users and menu items, so they can share one database.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool_of(&orm)).await?;
    Ok(Some(AppState::new(orm, AppConfig::for_database(database_url))))
}

async fn create_user(state: &AppState, role: &str) -> anyhow::Result<AuthUser> {
    let email = format!("{role}-{}@example.com", Uuid::new_v4());
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        password_hash: Set("dummy".into()),
        name: Set(role.into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email,
        role: role.into(),
    })
}

async fn create_menu_item(state: &AppState, price: i64, stock: i32) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test Dish {}", Uuid::new_v4())),
        description: Set(Some("A dish for testing".into())),
        category: Set("test".into()),
        price: Set(price),
        stock: Set(stock),
        is_available: Set(true),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

fn order_request(lines: Vec<(Uuid, i32)>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        items: lines
            .into_iter()
            .map(|(menu_item_id, quantity)| OrderLineRequest {
                menu_item_id,
                quantity,
            })
            .collect(),
        customer_name: "Test Customer".into(),
        customer_phone: "555-0100".into(),
        delivery_address: Some("1 Test Street".into()),
        address_id: None,
        notes: None,
    }
}

async fn stock_of(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    let item = menu_service::get_menu_item(state, id).await?;
    Ok(item.data.map(|i| i.stock).unwrap_or_default())
}

#[tokio::test]
async fn order_lifecycle_from_placement_to_completion() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, ROLE_USER).await?;
    let staff = create_user(&state, ROLE_STAFF).await?;
    let pizza = create_menu_item(&state, 1150, 10).await?;
    let soda = create_menu_item(&state, 300, 10).await?;

    // Repeated lines for the same item are merged.
    let placed = order_service::place_order(
        &state,
        &customer,
        order_request(vec![(pizza, 1), (soda, 2), (pizza, 1)]),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(placed.status, OrderStatus::Placed);
    assert_eq!(placed.items.len(), 2);
    assert_eq!(placed.total, 2 * 1150 + 2 * 300);
    assert_eq!(placed.progress_step, Some(0));
    assert!(placed.cancellable_until.is_some());
    assert_eq!(stock_of(&state, pizza).await?, 8);

    // Customers cannot move their own order forward.
    let err = order_service::update_order_status(
        &state,
        &customer,
        placed.id,
        UpdateOrderStatusRequest {
            status: "Processing".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let ready = order_service::update_order_status(
        &state,
        &staff,
        placed.id,
        UpdateOrderStatusRequest {
            status: "ready".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(ready.status, OrderStatus::Ready);
    assert_eq!(ready.cancellable_until, None);

    let err = order_service::update_order_status(
        &state,
        &staff,
        placed.id,
        UpdateOrderStatusRequest {
            status: "Processing".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    for status in ["Delivered", "Completed"] {
        order_service::update_order_status(
            &state,
            &staff,
            placed.id,
            UpdateOrderStatusRequest {
                status: status.into(),
            },
        )
        .await?;
    }

    let err = order_service::update_order_status(
        &state,
        &staff,
        placed.id,
        UpdateOrderStatusRequest {
            status: "Cancelled".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Completed orders leave the active list and show up in history.
    let active = order_service::list_my_orders(
        &state,
        &customer,
        OrderListQuery {
            scope: Some(food_order_api::order_status::OrderScope::Active),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert!(active.items.iter().all(|o| o.id != placed.id));

    let history = order_service::list_my_orders(
        &state,
        &customer,
        OrderListQuery {
            scope: Some(food_order_api::order_status::OrderScope::History),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert!(history.items.iter().any(|o| o.id == placed.id));

    let receipt = order_service::order_receipt(&state, &customer, placed.id).await?;
    assert!(receipt.contains("Test Customer"));
    assert!(receipt.contains("29.00"));

    Ok(())
}

#[tokio::test]
async fn owner_cancel_respects_window_and_restores_stock() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, ROLE_USER).await?;
    let dish = create_menu_item(&state, 900, 5).await?;

    let first = order_service::place_order(&state, &customer, order_request(vec![(dish, 2)]))
        .await?
        .data
        .expect("order");
    assert_eq!(stock_of(&state, dish).await?, 3);

    let cancelled = order_service::change_status_at(
        &state,
        &customer,
        first.id,
        OrderStatus::Cancelled,
        first.created_at + Duration::seconds(300),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, dish).await?, 5);

    let second = order_service::place_order(&state, &customer, order_request(vec![(dish, 1)]))
        .await?
        .data
        .expect("order");
    let err = order_service::change_status_at(
        &state,
        &customer,
        second.id,
        OrderStatus::Cancelled,
        second.created_at + Duration::seconds(301),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(stock_of(&state, dish).await?, 4);

    Ok(())
}

#[tokio::test]
async fn other_users_cannot_see_an_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, ROLE_USER).await?;
    let stranger = create_user(&state, ROLE_USER).await?;
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let dish = create_menu_item(&state, 500, 5).await?;

    let order = order_service::place_order(&state, &owner, order_request(vec![(dish, 1)]))
        .await?
        .data
        .expect("order");

    let err = order_service::get_order(&state, &stranger, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let seen = order_service::get_order(&state, &admin, order.id).await?;
    assert_eq!(seen.data.map(|o| o.id), Some(order.id));

    Ok(())
}

#[tokio::test]
async fn insufficient_stock_leaves_inventory_untouched() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, ROLE_USER).await?;
    let plenty = create_menu_item(&state, 100, 50).await?;
    let scarce = create_menu_item(&state, 100, 1).await?;

    let err = order_service::place_order(
        &state,
        &customer,
        order_request(vec![(plenty, 3), (scarce, 2)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(stock_of(&state, plenty).await?, 50);
    assert_eq!(stock_of(&state, scarce).await?, 1);

    let err = order_service::place_order(&state, &customer, order_request(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn staff_inventory_and_summary() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = create_user(&state, ROLE_USER).await?;
    let staff = create_user(&state, ROLE_STAFF).await?;
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let dish = create_menu_item(&state, 700, 4).await?;
    let sold_out = create_menu_item(&state, 700, 0).await?;

    order_service::place_order(&state, &customer, order_request(vec![(dish, 2)])).await?;

    let low = inventory_service::list_low_stock(
        &state,
        &staff,
        LowStockQuery {
            threshold: Some(2),
            per_page: Some(100),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("items");
    assert!(low.items.iter().any(|i| i.id == dish));
    assert!(low.items.iter().all(|i| i.id != sold_out));

    let err = inventory_service::adjust_inventory(
        &state,
        &staff,
        dish,
        InventoryAdjustRequest { delta: 5 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = inventory_service::adjust_inventory(
        &state,
        &admin,
        dish,
        InventoryAdjustRequest { delta: -3 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let restocked = inventory_service::adjust_inventory(
        &state,
        &admin,
        dish,
        InventoryAdjustRequest { delta: 10 },
    )
    .await?
    .data
    .expect("item");
    assert_eq!(restocked.stock, 12);

    let audit = AuditLogs::find()
        .filter(audit_logs::Column::UserId.eq(admin.user_id))
        .filter(audit_logs::Column::Action.eq("inventory_adjust"))
        .one(&state.orm)
        .await?
        .expect("audit entry");
    assert_eq!(
        audit.metadata.and_then(|m| m.get("delta").cloned()),
        Some(serde_json::json!(10))
    );

    let summary = order_service::order_summary(&state, &staff)
        .await?
        .data
        .expect("summary");
    assert!(summary.total_orders >= 1);
    assert!(summary.revenue >= 1400);

    let err = order_service::order_summary(&state, &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn search_wildcards_match_literally() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    create_menu_item(&state, 100, 1).await?;

    let by_category = menu_service::list_menu_items(
        &state,
        MenuItemQuery {
            category: Some("%".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("items");
    assert!(by_category.items.is_empty());

    let by_name = menu_service::list_menu_items(
        &state,
        MenuItemQuery {
            q: Some("_".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("items");
    assert!(by_name.items.iter().all(|i| i.name.contains('_')));

    let matching = menu_service::list_menu_items(
        &state,
        MenuItemQuery {
            q: Some("Test Dish".into()),
            category: Some("TEST".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("items");
    assert!(!matching.items.is_empty());

    Ok(())
}
