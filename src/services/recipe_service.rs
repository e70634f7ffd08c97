use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::record,
    dto::{
        recipes::{CreateRecipeRequest, RecipeList, TrendingRecipe, TrendingRecipeList},
        validated,
    },
    entity::recipes::{ActiveModel, Column, Entity as Recipes},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Recipe,
    response::{ApiResponse, Meta},
    routes::params::{LimitQuery, RecipeQuery, RecipeSortBy, SortOrder},
    services::{contains_pattern, escape_like},
    state::AppState,
};

pub async fn list_recipes(
    state: &AppState,
    query: RecipeQuery,
) -> AppResult<ApiResponse<RecipeList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::col(Column::Category).ilike(escape_like(category.trim())));
    }

    if let Some(max_prep) = query.max_prep_minutes {
        condition = condition.add(Column::PrepMinutes.lte(max_prep));
    }

    let sort_col = match query.sort_by.unwrap_or(RecipeSortBy::CreatedAt) {
        RecipeSortBy::CreatedAt => Column::CreatedAt,
        RecipeSortBy::Title => Column::Title,
        RecipeSortBy::PrepMinutes => Column::PrepMinutes,
    };

    let mut finder = Recipes::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

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
    Ok(ApiResponse::success("Recipes", RecipeList { items }, Some(meta)))
}

/// Most favorited first; ties go to the newer recipe.
pub async fn trending_recipes(
    state: &AppState,
    query: LimitQuery,
) -> AppResult<ApiResponse<TrendingRecipeList>> {
    let limit = query.normalize() as i64;

    let ranked: Vec<(Uuid, i64)> = sqlx::query_as(
        r#"
        SELECT r.id, COUNT(f.id) AS favorite_count
        FROM recipes r
        LEFT JOIN favorite_recipes f ON f.recipe_id = r.id
        GROUP BY r.id, r.created_at
        ORDER BY favorite_count DESC, r.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
    let mut by_id: HashMap<Uuid, Recipe> = Recipes::find()
        .filter(Column::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| (model.id, Recipe::from(model)))
        .collect();

    let items = ranked
        .into_iter()
        .filter_map(|(id, favorite_count)| {
            by_id.remove(&id).map(|recipe| TrendingRecipe {
                recipe,
                favorite_count,
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "Trending recipes",
        TrendingRecipeList { items },
        Some(Meta::empty()),
    ))
}

pub async fn recent_recipes(
    state: &AppState,
    query: LimitQuery,
) -> AppResult<ApiResponse<RecipeList>> {
    let items = Recipes::find()
        .order_by_desc(Column::CreatedAt)
        .limit(query.normalize())
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Recipe::from)
        .collect();

    Ok(ApiResponse::success(
        "Recent recipes",
        RecipeList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_recipe(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Recipe>> {
    let recipe = Recipes::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Recipe::from)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Recipe", recipe, None))
}

pub async fn create_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    ensure_admin(user)?;
    let payload = validated(payload)?;

    let ingredients: Vec<String> = payload
        .ingredients
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(AppError::BadRequest("at least one ingredient is required".into()));
    }

    let recipe = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        ingredients: Set(serde_json::json!(ingredients)),
        instructions: Set(payload.instructions),
        category: Set(payload.category.trim().to_string()),
        prep_minutes: Set(payload.prep_minutes),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    record(
        &state.pool,
        user.user_id,
        "recipe_create",
        "recipes",
        serde_json::json!({ "recipe_id": recipe.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Recipe created",
        Recipe::from(recipe),
        Some(Meta::empty()),
    ))
}
