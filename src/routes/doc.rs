use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, AddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        favorites::{
            AddFavoriteMenuItemRequest, AddFavoriteRecipeRequest, FavoriteMenuItemList,
            FavoriteRecipeList, FavoriteRemoved, FavoriteStatus,
        },
        inventory::{InventoryAdjustRequest, InventoryStats},
        menu_items::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
        orders::{
            OrderLineRequest, OrderList, OrderSummary, PlaceOrderRequest, StatusCount,
            UpdateOrderStatusRequest,
        },
        recipes::{CreateRecipeRequest, RecipeList, TrendingRecipe, TrendingRecipeList},
        reviews::{CreateReviewRequest, MenuItemReviews, ReviewList},
    },
    models::{
        Address, AddressLabel, FavoriteMenuItem, FavoriteRecipe, MenuItem, Order, OrderItem,
        Recipe, Review, User,
    },
    order_status::{OrderScope, OrderStatus},
    response::{ApiResponse, Meta},
    routes::{
        addresses, auth, favorites, health, inventory, menu_items, orders, params, recipes,
        reviews,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        menu_items::list_menu_items,
        menu_items::create_menu_item,
        menu_items::get_menu_item,
        menu_items::update_menu_item,
        menu_items::list_menu_item_reviews,
        inventory::inventory_stats,
        inventory::list_low_stock,
        inventory::adjust_inventory,
        recipes::list_recipes,
        recipes::create_recipe,
        recipes::trending_recipes,
        recipes::recent_recipes,
        recipes::get_recipe,
        favorites::list_favorite_recipes,
        favorites::add_favorite_recipe,
        favorites::remove_favorite_recipe,
        favorites::list_favorite_menu_items,
        favorites::add_favorite_menu_item,
        favorites::is_favorite_menu_item,
        favorites::remove_favorite_menu_item,
        addresses::list_addresses,
        addresses::create_address,
        addresses::update_address,
        addresses::delete_address,
        addresses::set_default_address,
        orders::place_order,
        orders::list_my_orders,
        orders::list_all_orders,
        orders::order_summary,
        orders::get_order,
        orders::update_order_status,
        orders::order_receipt,
        reviews::create_review,
        reviews::list_my_reviews,
        reviews::delete_review
    ),
    components(
        schemas(
            User,
            MenuItem,
            Recipe,
            Order,
            OrderItem,
            OrderStatus,
            OrderScope,
            Address,
            AddressLabel,
            Review,
            FavoriteRecipe,
            FavoriteMenuItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            InventoryAdjustRequest,
            InventoryStats,
            CreateRecipeRequest,
            RecipeList,
            TrendingRecipe,
            TrendingRecipeList,
            AddFavoriteRecipeRequest,
            AddFavoriteMenuItemRequest,
            FavoriteRecipeList,
            FavoriteMenuItemList,
            FavoriteStatus,
            FavoriteRemoved,
            AddressRequest,
            AddressList,
            OrderLineRequest,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            StatusCount,
            OrderSummary,
            CreateReviewRequest,
            ReviewList,
            MenuItemReviews,
            params::Pagination,
            params::MenuItemQuery,
            params::RecipeQuery,
            params::OrderListQuery,
            params::LowStockQuery,
            Meta,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<RecipeList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Menu", description = "Menu items"),
        (name = "Inventory", description = "Stock levels, staff only"),
        (name = "Recipes", description = "Recipe catalog"),
        (name = "Favorites", description = "Saved recipes and menu items"),
        (name = "Addresses", description = "Delivery addresses"),
        (name = "Orders", description = "Ordering, status and receipts"),
        (name = "Reviews", description = "Ratings for delivered orders"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
