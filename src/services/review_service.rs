use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::{
        reviews::{CreateReviewRequest, MenuItemReviews, ReviewList},
        validated,
    },
    entity::{
        menu_items::Entity as MenuItems,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        reviews::{ActiveModel, Column, Entity as Reviews},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Review, parse_stored_status},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let payload = validated(payload)?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(payload.order_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let status = parse_stored_status(&order.status)?;
    if !status.is_fulfilled() {
        return Err(AppError::BadRequest(format!(
            "Only delivered or completed orders can be reviewed, this one is {status}"
        )));
    }

    if let Some(menu_item_id) = payload.menu_item_id {
        let contains = OrderItems::find()
            .filter(
                Condition::all()
                    .add(OrderItemCol::OrderId.eq(order.id))
                    .add(OrderItemCol::MenuItemId.eq(menu_item_id)),
            )
            .one(&state.orm)
            .await?
            .is_some();
        if !contains {
            return Err(AppError::BadRequest("That item is not part of the order".into()));
        }
    }

    let mut duplicate = Condition::all()
        .add(Column::UserId.eq(user.user_id))
        .add(Column::OrderId.eq(order.id));
    duplicate = match payload.menu_item_id {
        Some(menu_item_id) => duplicate.add(Column::MenuItemId.eq(menu_item_id)),
        None => duplicate.add(Column::MenuItemId.is_null()),
    };
    if Reviews::find().filter(duplicate).one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("You already reviewed this".into()));
    }

    let review = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_id: Set(order.id),
        menu_item_id: Set(payload.menu_item_id),
        rating: Set(payload.rating),
        comment: Set(payload
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(duplicate_as_conflict)?;

    tracing::info!(review_id = %review.id, order_id = %order.id, rating = review.rating, "review created");

    Ok(ApiResponse::success(
        "Review created",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

/// A concurrent duplicate slips past the lookup and trips `reviews_unique_idx`.
fn duplicate_as_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("You already reviewed this".into())
        }
        _ => AppError::OrmError(err),
    }
}

pub async fn list_my_reviews(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Reviews::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_menu_item_reviews(
    state: &AppState,
    menu_item_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<MenuItemReviews>> {
    if MenuItems::find_by_id(menu_item_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let (page, limit, offset) = pagination.normalize();

    let (review_count, average_rating): (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), AVG(rating)::FLOAT8 FROM reviews WHERE menu_item_id = $1",
    )
    .bind(menu_item_id)
    .fetch_one(&state.pool)
    .await?;

    let items = Reviews::find()
        .filter(Column::MenuItemId.eq(menu_item_id))
        .order_by_desc(Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        MenuItemReviews {
            average_rating: average_rating.map(|avg| (avg * 10.0).round() / 10.0),
            review_count,
            items,
        },
        Some(Meta::new(page, limit, review_count)),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if review.user_id != user.user_id {
        if !user.is_admin() {
            return Err(AppError::NotFound);
        }
        tracing::info!(review_id = %id, admin = %user.user_id, "review removed by admin");
    }

    Reviews::delete_by_id(review.id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
