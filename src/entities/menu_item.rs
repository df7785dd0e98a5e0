//! Menu item entity - A dish on the restaurant menu.
//!
//! Menu items are publicly readable and managed by members of the Manager group.
//! Cart rows and order items reference a menu item by ID.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier for the menu item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the dish (e.g., "Greek Salad")
    pub name: String,
    /// Current unit price
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub price: Decimal,
    /// Free-form category (e.g., "Mains", "Desserts")
    pub category: String,
}

/// Defines relationships between `MenuItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A menu item can sit in many carts
    #[sea_orm(has_many = "super::cart::Entity")]
    Carts,
    /// A menu item can appear in many orders
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
