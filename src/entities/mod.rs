//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod auth_token;
pub mod cart;
pub mod group;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod user;
pub mod user_group;

// Re-export specific types to avoid conflicts
pub use auth_token::{Column as AuthTokenColumn, Entity as AuthToken, Model as AuthTokenModel};
pub use cart::{Column as CartColumn, Entity as Cart, Model as CartModel};
pub use group::{Column as GroupColumn, Entity as Group, Model as GroupModel};
pub use menu_item::{Column as MenuItemColumn, Entity as MenuItem, Model as MenuItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_group::{Column as UserGroupColumn, Entity as UserGroup, Model as UserGroupModel};
