use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::favorites::{FavoriteMenuItemList, FavoriteRecipeList, FavoriteRemoved, FavoriteStatus},
    entity::{
        favorite_menu_items::{
            self, ActiveModel as FavMenuActive, Column as FavMenuCol, Entity as FavoriteMenuItems,
        },
        favorite_recipes::{
            self, ActiveModel as FavRecipeActive, Column as FavRecipeCol, Entity as FavoriteRecipes,
        },
        menu_items::{Entity as MenuItems, Model as MenuItemModel},
        recipes::{Entity as Recipes, Model as RecipeModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{FavoriteMenuItem, FavoriteRecipe, MenuItem, Recipe},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_favorite_recipes(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteRecipeList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Recipes::find()
        .join(
            JoinType::InnerJoin,
            favorite_recipes::Relation::Recipes.def().rev(),
        )
        .filter(FavRecipeCol::UserId.eq(user.user_id))
        .order_by_desc(FavRecipeCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Recipe::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", FavoriteRecipeList { items }, Some(meta)))
}

/// Adding a recipe that is already a favorite returns the existing row.
pub async fn add_favorite_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<FavoriteRecipe>> {
    let recipe: Option<RecipeModel> = Recipes::find_by_id(recipe_id).one(&state.orm).await?;
    if recipe.is_none() {
        return Err(AppError::NotFound);
    }

    // Concurrent adds race on the unique key; the loser inserts nothing.
    FavoriteRecipes::insert(FavRecipeActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        recipe_id: Set(recipe_id),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([FavRecipeCol::UserId, FavRecipeCol::RecipeId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    let favorite = FavoriteRecipes::find()
        .filter(
            Condition::all()
                .add(FavRecipeCol::UserId.eq(user.user_id))
                .add(FavRecipeCol::RecipeId.eq(recipe_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Added to favorites",
        FavoriteRecipe::from(favorite),
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<FavoriteRemoved>> {
    let result = FavoriteRecipes::delete_many()
        .filter(
            Condition::all()
                .add(FavRecipeCol::UserId.eq(user.user_id))
                .add(FavRecipeCol::RecipeId.eq(recipe_id)),
        )
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Removed from favorites",
        FavoriteRemoved {
            removed: result.rows_affected > 0,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_favorite_menu_items(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteMenuItemList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = MenuItems::find()
        .join(
            JoinType::InnerJoin,
            favorite_menu_items::Relation::MenuItems.def().rev(),
        )
        .filter(FavMenuCol::UserId.eq(user.user_id))
        .order_by_desc(FavMenuCol::CreatedAt);

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
    Ok(ApiResponse::success("OK", FavoriteMenuItemList { items }, Some(meta)))
}

pub async fn add_favorite_menu_item(
    state: &AppState,
    user: &AuthUser,
    menu_item_id: Uuid,
) -> AppResult<ApiResponse<FavoriteMenuItem>> {
    let item: Option<MenuItemModel> = MenuItems::find_by_id(menu_item_id).one(&state.orm).await?;
    if item.is_none() {
        return Err(AppError::NotFound);
    }

    FavoriteMenuItems::insert(FavMenuActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        menu_item_id: Set(menu_item_id),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([FavMenuCol::UserId, FavMenuCol::MenuItemId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    let favorite = FavoriteMenuItems::find()
        .filter(
            Condition::all()
                .add(FavMenuCol::UserId.eq(user.user_id))
                .add(FavMenuCol::MenuItemId.eq(menu_item_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Added to favorites",
        FavoriteMenuItem::from(favorite),
        Some(Meta::empty()),
    ))
}

pub async fn is_favorite_menu_item(
    pool: &DbPool,
    user: &AuthUser,
    menu_item_id: Uuid,
) -> AppResult<ApiResponse<FavoriteStatus>> {
    let (favorite,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM favorite_menu_items WHERE user_id = $1 AND menu_item_id = $2)",
    )
    .bind(user.user_id)
    .bind(menu_item_id)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "OK",
        FavoriteStatus { favorite },
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite_menu_item(
    state: &AppState,
    user: &AuthUser,
    menu_item_id: Uuid,
) -> AppResult<ApiResponse<FavoriteRemoved>> {
    let result = FavoriteMenuItems::delete_many()
        .filter(
            Condition::all()
                .add(FavMenuCol::UserId.eq(user.user_id))
                .add(FavMenuCol::MenuItemId.eq(menu_item_id)),
        )
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Removed from favorites",
        FavoriteRemoved {
            removed: result.rows_affected > 0,
        },
        Some(Meta::empty()),
    ))
}
