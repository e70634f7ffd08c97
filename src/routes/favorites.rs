use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::favorites::{
        AddFavoriteMenuItemRequest, AddFavoriteRecipeRequest, FavoriteMenuItemList,
        FavoriteRecipeList, FavoriteRemoved, FavoriteStatus,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{FavoriteMenuItem, FavoriteRecipe},
    response::ApiResponse,
    routes::params::Pagination,
    sanitize::SanitizedJson,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(list_favorite_recipes).post(add_favorite_recipe),
        )
        .route(
            "/recipes/{id}",
            delete(remove_favorite_recipe),
        )
        .route(
            "/menu-items",
            get(list_favorite_menu_items).post(add_favorite_menu_item),
        )
        .route(
            "/menu-items/{id}",
            get(is_favorite_menu_item).delete(remove_favorite_menu_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/favorites/recipes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Favorite recipes", body = ApiResponse<FavoriteRecipeList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorite_recipes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<FavoriteRecipeList>>> {
    let resp = favorite_service::list_favorite_recipes(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/favorites/recipes",
    request_body = AddFavoriteRecipeRequest,
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse<FavoriteRecipe>),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    SanitizedJson(payload): SanitizedJson<AddFavoriteRecipeRequest>,
) -> AppResult<Json<ApiResponse<FavoriteRecipe>>> {
    let resp = favorite_service::add_favorite_recipe(&state, &user, payload.recipe_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Removed from favorites", body = ApiResponse<FavoriteRemoved>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FavoriteRemoved>>> {
    let resp = favorite_service::remove_favorite_recipe(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/menu-items",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Favorite menu items", body = ApiResponse<FavoriteMenuItemList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorite_menu_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<FavoriteMenuItemList>>> {
    let resp = favorite_service::list_favorite_menu_items(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/favorites/menu-items",
    request_body = AddFavoriteMenuItemRequest,
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse<FavoriteMenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    SanitizedJson(payload): SanitizedJson<AddFavoriteMenuItemRequest>,
) -> AppResult<Json<ApiResponse<FavoriteMenuItem>>> {
    let resp =
        favorite_service::add_favorite_menu_item(&state, &user, payload.menu_item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/menu-items/{id}",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Whether the item is a favorite", body = ApiResponse<FavoriteStatus>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn is_favorite_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FavoriteStatus>>> {
    let resp = favorite_service::is_favorite_menu_item(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/menu-items/{id}",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Removed from favorites", body = ApiResponse<FavoriteRemoved>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FavoriteRemoved>>> {
    let resp = favorite_service::remove_favorite_menu_item(&state, &user, id).await?;
    Ok(Json(resp))
}
