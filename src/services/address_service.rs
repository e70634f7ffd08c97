//! Saved delivery addresses. Every default change runs in one transaction
//! so a user never ends up with two defaults.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    dto::{
        addresses::{AddressList, AddressRequest},
        validated,
    },
    entity::addresses::{ActiveModel, Column, Entity as Addresses, Model as AddressModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::IsDefault)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    Ok(ApiResponse::success(
        "Addresses",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

pub async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<AddressModel> {
    Addresses::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::UserId.eq(user.user_id)),
        )
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn clear_defaults<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    Addresses::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .filter(
            Condition::all()
                .add(Column::UserId.eq(user_id))
                .add(Column::IsDefault.eq(true)),
        )
        .exec(conn)
        .await?;
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let payload = validated(payload)?;
    let txn = state.orm.begin().await?;

    let has_any = Addresses::find()
        .filter(Column::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .is_some();

    // A user's first address is always the default.
    let make_default = payload.is_default.unwrap_or(false) || !has_any;
    if make_default {
        clear_defaults(&txn, user.user_id).await?;
    }

    let address = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        label: Set(payload.label.to_string()),
        full_name: Set(payload.full_name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        line1: Set(payload.line1.trim().to_string()),
        line2: Set(trimmed(payload.line2)),
        city: Set(payload.city.trim().to_string()),
        postal_code: Set(payload.postal_code.trim().to_string()),
        instructions: Set(trimmed(payload.instructions)),
        is_default: Set(make_default),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address created",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let payload = validated(payload)?;
    let txn = state.orm.begin().await?;

    let existing = find_owned(&txn, user, id).await?;
    let make_default = payload.is_default == Some(true) && !existing.is_default;
    if make_default {
        clear_defaults(&txn, user.user_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.label = Set(payload.label.to_string());
    active.full_name = Set(payload.full_name.trim().to_string());
    active.phone = Set(payload.phone.trim().to_string());
    active.line1 = Set(payload.line1.trim().to_string());
    active.line2 = Set(trimmed(payload.line2));
    active.city = Set(payload.city.trim().to_string());
    active.postal_code = Set(payload.postal_code.trim().to_string());
    active.instructions = Set(trimmed(payload.instructions));
    if make_default {
        active.is_default = Set(true);
    }
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address updated",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn set_default_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let txn = state.orm.begin().await?;

    let existing = find_owned(&txn, user, id).await?;
    clear_defaults(&txn, user.user_id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Default address updated",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

/// Deleting the default promotes the most recently created remaining address.
pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let existing = find_owned(&txn, user, id).await?;
    let was_default = existing.is_default;
    Addresses::delete_by_id(existing.id).exec(&txn).await?;

    let mut promoted = None;
    if was_default {
        let next = Addresses::find()
            .filter(Column::UserId.eq(user.user_id))
            .order_by_desc(Column::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: ActiveModel = next.into();
            active.is_default = Set(true);
            active.updated_at = Set(Utc::now().into());
            promoted = Some(active.update(&txn).await?.id);
        }
    }

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address deleted",
        serde_json::json!({ "id": id, "promoted_default": promoted }),
        Some(Meta::empty()),
    ))
}
