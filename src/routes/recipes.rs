use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::recipes::{CreateRecipeRequest, RecipeList, TrendingRecipeList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Recipe,
    response::ApiResponse,
    routes::params::{LimitQuery, RecipeQuery},
    sanitize::SanitizedJson,
    services::recipe_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/trending", get(trending_recipes))
        .route("/recent", get(recent_recipes))
        .route("/{id}", get(get_recipe))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search title or description"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("max_prep_minutes" = Option<i32>, Query, description = "Upper bound on prep time"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, title, prep_minutes"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Recipes", body = ApiResponse<RecipeList>)
    ),
    tag = "Recipes"
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<ApiResponse<RecipeList>>> {
    let resp = recipe_service::list_recipes(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 200, description = "Recipe created", body = ApiResponse<Recipe>),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    SanitizedJson(payload): SanitizedJson<CreateRecipeRequest>,
) -> AppResult<Json<ApiResponse<Recipe>>> {
    let resp = recipe_service::create_recipe(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/recipes/trending",
    params(("limit" = Option<u64>, Query, description = "How many, default 6, max 50")),
    responses(
        (status = 200, description = "Most favorited recipes", body = ApiResponse<TrendingRecipeList>)
    ),
    tag = "Recipes"
)]
pub async fn trending_recipes(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<TrendingRecipeList>>> {
    let resp = recipe_service::trending_recipes(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/recipes/recent",
    params(("limit" = Option<u64>, Query, description = "How many, default 6, max 50")),
    responses(
        (status = 200, description = "Newest recipes", body = ApiResponse<RecipeList>)
    ),
    tag = "Recipes"
)]
pub async fn recent_recipes(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<RecipeList>>> {
    let resp = recipe_service::recent_recipes(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe", body = ApiResponse<Recipe>),
        (status = 404, description = "Not Found")
    ),
    tag = "Recipes"
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Recipe>>> {
    let resp = recipe_service::get_recipe(&state, id).await?;
    Ok(Json(resp))
}
