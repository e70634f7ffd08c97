use std::time::Duration;

use axum::{Router, middleware::from_fn_with_state};

use crate::{
    config::AppConfig,
    middleware::rate_limit::{RateLimiter, rate_limit},
    state::AppState,
};

pub mod addresses;
pub mod auth;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod inventory;
pub mod menu_items;
pub mod orders;
pub mod params;
pub mod recipes;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
// Auth routes sit behind a stricter limiter in addition to the general one.
pub fn create_api_router(config: &AppConfig) -> Router<AppState> {
    let window = Duration::from_secs(config.rate_limit_window_secs);
    let general = RateLimiter::new("api", config.rate_limit_max, window);
    let auth_limiter = RateLimiter::new("auth", config.auth_rate_limit_max, window);

    Router::new()
        .nest(
            "/auth",
            auth::router().layer(from_fn_with_state(auth_limiter, rate_limit)),
        )
        .nest("/menu-items", menu_items::router())
        .nest("/inventory", inventory::router())
        .nest("/recipes", recipes::router())
        .nest("/favorites", favorites::router())
        .nest("/addresses", addresses::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .layer(from_fn_with_state(general, rate_limit))
}
