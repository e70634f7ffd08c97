pub mod addresses;
pub mod audit_logs;
pub mod favorite_menu_items;
pub mod favorite_recipes;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod recipes;
pub mod reviews;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use favorite_menu_items::Entity as FavoriteMenuItems;
pub use favorite_recipes::Entity as FavoriteRecipes;
pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use recipes::Entity as Recipes;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
