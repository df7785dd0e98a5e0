//! Cart entity - One selected menu item in a user's cart.
//!
//! `unit_price` and `price` are snapshotted when the row is created, so later
//! menu price changes do not affect what the customer sees at checkout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    /// Unique identifier for the cart row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the cart
    pub user_id: i64,
    /// The selected menu item
    pub menuitem_id: i64,
    /// Number of units
    pub quantity: i32,
    /// Menu price at the time the row was added
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub unit_price: Decimal,
    /// `unit_price * quantity`
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub price: Decimal,
}

/// Defines relationships between Cart and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart row belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each cart row references one menu item
    #[sea_orm(
        belongs_to = "super::menu_item::Entity",
        from = "Column::MenuitemId",
        to = "super::menu_item::Column::Id",
        on_delete = "Cascade"
    )]
    MenuItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
