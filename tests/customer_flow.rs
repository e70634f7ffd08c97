use food_order_api::{
    config::AppConfig,
    db::{create_orm_conn, pool_of},
    dto::{
        addresses::AddressRequest,
        orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
        recipes::CreateRecipeRequest,
        reviews::CreateReviewRequest,
    },
    entity::{menu_items::ActiveModel as MenuItemActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    models::{AddressLabel, ROLE_ADMIN, ROLE_STAFF, ROLE_USER},
    routes::params::{LimitQuery, Pagination},
    services::{
        address_service, favorite_service, order_service, recipe_service, review_service,
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run customer flow tests.");
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

async fn create_menu_item(state: &AppState) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Review Dish {}", Uuid::new_v4())),
        description: Set(None),
        category: Set("test".into()),
        price: Set(1000),
        stock: Set(20),
        is_available: Set(true),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

fn address(line1: &str, is_default: Option<bool>) -> AddressRequest {
    AddressRequest {
        label: AddressLabel::Home,
        full_name: "Test Customer".into(),
        phone: "555-0100".into(),
        line1: line1.into(),
        line2: None,
        city: "Springfield".into(),
        postal_code: "12345".into(),
        instructions: None,
        is_default,
    }
}

async fn default_count(state: &AppState, user: &AuthUser) -> anyhow::Result<usize> {
    let list = address_service::list_addresses(state, user)
        .await?
        .data
        .expect("addresses");
    Ok(list.items.iter().filter(|a| a.is_default).count())
}

#[tokio::test]
async fn a_user_always_has_at_most_one_default_address() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, ROLE_USER).await?;

    let first = address_service::create_address(&state, &user, address("1 First St", None))
        .await?
        .data
        .expect("address");
    assert!(first.is_default, "first address becomes the default");

    let second = address_service::create_address(&state, &user, address("2 Second St", Some(true)))
        .await?
        .data
        .expect("address");
    assert!(second.is_default);
    assert_eq!(default_count(&state, &user).await?, 1);

    let third = address_service::create_address(&state, &user, address("3 Third St", None))
        .await?
        .data
        .expect("address");
    assert!(!third.is_default);

    address_service::set_default_address(&state, &user, first.id).await?;
    assert_eq!(default_count(&state, &user).await?, 1);

    // Deleting the default promotes the newest remaining address.
    let deleted = address_service::delete_address(&state, &user, first.id)
        .await?
        .data
        .expect("result");
    assert_eq!(deleted["promoted_default"], serde_json::json!(third.id));

    let list = address_service::list_addresses(&state, &user)
        .await?
        .data
        .expect("addresses");
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[0].id, third.id);
    assert!(list.items[0].is_default);

    // Addresses are private to their owner.
    let stranger = create_user(&state, ROLE_USER).await?;
    let err = address_service::delete_address(&state, &stranger, third.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // An order can reference a saved address.
    let dish = create_menu_item(&state).await?;
    let order = order_service::place_order(
        &state,
        &user,
        PlaceOrderRequest {
            items: vec![OrderLineRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            customer_name: "Test Customer".into(),
            customer_phone: "555-0100".into(),
            delivery_address: None,
            address_id: Some(third.id),
            notes: None,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(order.delivery_address, "3 Third St, Springfield, 12345");

    Ok(())
}

#[tokio::test]
async fn favorites_are_idempotent_and_drive_trending() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let user = create_user(&state, ROLE_USER).await?;

    let recipe = recipe_service::create_recipe(
        &state,
        &admin,
        CreateRecipeRequest {
            title: format!("Trending Soup {}", Uuid::new_v4()),
            description: Some("Warm".into()),
            ingredients: vec!["water".into(), " salt ".into(), "  ".into()],
            instructions: "Boil.".into(),
            category: "soup".into(),
            prep_minutes: 5,
            image_url: None,
        },
    )
    .await?
    .data
    .expect("recipe");
    assert_eq!(recipe.ingredients, vec!["water", "salt"]);

    let err = recipe_service::create_recipe(
        &state,
        &user,
        CreateRecipeRequest {
            title: "Nope".into(),
            description: None,
            ingredients: vec!["x".into()],
            instructions: "x".into(),
            category: "x".into(),
            prep_minutes: 1,
            image_url: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let a = favorite_service::add_favorite_recipe(&state, &user, recipe.id)
        .await?
        .data
        .expect("favorite");
    let b = favorite_service::add_favorite_recipe(&state, &user, recipe.id)
        .await?
        .data
        .expect("favorite");
    assert_eq!(a.id, b.id);

    let list = favorite_service::list_favorite_recipes(&state, &user, Pagination::default())
        .await?
        .data
        .expect("favorites");
    assert_eq!(list.items.len(), 1);

    let err = favorite_service::add_favorite_recipe(&state, &user, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let trending = recipe_service::trending_recipes(&state, LimitQuery { limit: Some(50) })
        .await?
        .data
        .expect("trending");
    assert!(
        trending
            .items
            .iter()
            .any(|t| t.recipe.id == recipe.id && t.favorite_count >= 1)
    );

    let removed = favorite_service::remove_favorite_recipe(&state, &user, recipe.id)
        .await?
        .data
        .expect("removed");
    assert!(removed.removed);
    let removed = favorite_service::remove_favorite_recipe(&state, &user, recipe.id)
        .await?
        .data
        .expect("removed");
    assert!(!removed.removed);

    let dish = create_menu_item(&state).await?;
    favorite_service::add_favorite_menu_item(&state, &user, dish).await?;
    let status = favorite_service::is_favorite_menu_item(&state.pool, &user, dish)
        .await?
        .data
        .expect("status");
    assert!(status.favorite);

    Ok(())
}

#[tokio::test]
async fn only_fulfilled_orders_can_be_reviewed_once() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, ROLE_USER).await?;
    let staff = create_user(&state, ROLE_STAFF).await?;
    let dish = create_menu_item(&state).await?;
    let other_dish = create_menu_item(&state).await?;

    let order = order_service::place_order(
        &state,
        &user,
        PlaceOrderRequest {
            items: vec![OrderLineRequest {
                menu_item_id: dish,
                quantity: 2,
            }],
            customer_name: "Test Customer".into(),
            customer_phone: "555-0100".into(),
            delivery_address: Some("1 Test Street".into()),
            address_id: None,
            notes: None,
        },
    )
    .await?
    .data
    .expect("order");

    let review = |menu_item_id| CreateReviewRequest {
        order_id: order.id,
        menu_item_id: Some(menu_item_id),
        rating: 4,
        comment: Some("  Tasty  ".into()),
    };

    let err = review_service::create_review(&state, &user, review(dish))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    order_service::update_order_status(
        &state,
        &staff,
        order.id,
        UpdateOrderStatusRequest {
            status: "Delivered".into(),
        },
    )
    .await?;

    let err = review_service::create_review(&state, &user, review(other_dish))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let created = review_service::create_review(&state, &user, review(dish))
        .await?
        .data
        .expect("review");
    assert_eq!(created.comment.as_deref(), Some("Tasty"));

    let err = review_service::create_review(&state, &user, review(dish))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let summary = review_service::list_menu_item_reviews(&state, dish, Pagination::default())
        .await?
        .data
        .expect("reviews");
    assert_eq!(summary.review_count, 1);
    assert_eq!(summary.average_rating, Some(4.0));

    let stranger = create_user(&state, ROLE_USER).await?;
    let err = review_service::delete_review(&state, &stranger, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    review_service::delete_review(&state, &user, created.id).await?;
    let mine = review_service::list_my_reviews(&state, &user, Pagination::default())
        .await?
        .data
        .expect("reviews");
    assert!(mine.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn concurrent_duplicates_stay_idempotent_or_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, ROLE_USER).await?;
    let staff = create_user(&state, ROLE_STAFF).await?;
    let dish = create_menu_item(&state).await?;

    let (a, b) = tokio::join!(
        favorite_service::add_favorite_menu_item(&state, &user, dish),
        favorite_service::add_favorite_menu_item(&state, &user, dish),
    );
    let (a, b) = (a?.data.expect("favorite"), b?.data.expect("favorite"));
    assert_eq!(a.id, b.id);

    let order = order_service::place_order(
        &state,
        &user,
        PlaceOrderRequest {
            items: vec![OrderLineRequest {
                menu_item_id: dish,
                quantity: 1,
            }],
            customer_name: "Test Customer".into(),
            customer_phone: "555-0100".into(),
            delivery_address: Some("1 Test Street".into()),
            address_id: None,
            notes: None,
        },
    )
    .await?
    .data
    .expect("order");
    order_service::update_order_status(
        &state,
        &staff,
        order.id,
        UpdateOrderStatusRequest {
            status: "Completed".into(),
        },
    )
    .await?;

    let review = || CreateReviewRequest {
        order_id: order.id,
        menu_item_id: None,
        rating: 5,
        comment: None,
    };
    let (first, second) = tokio::join!(
        review_service::create_review(&state, &user, review()),
        review_service::create_review(&state, &user, review()),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict(_))))
    );

    Ok(())
}
