//! Order entity - A finalized purchase created from a user's cart.
//!
//! Orders are tracked through delivery with a single `status` flag and an
//! optional assigned delivery crew member.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who placed the order
    pub user_id: i64,
    /// Delivery crew member assigned to the order, if any
    pub delivery_crew_id: Option<i64>,
    /// `false` while out for delivery, `true` once delivered
    pub status: bool,
    /// Sum of the order item prices at checkout
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub total: Decimal,
    /// Day the order was placed
    pub date: Date,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The customer who placed the order
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// The assigned delivery crew member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DeliveryCrewId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    DeliveryCrew,
    /// One order has many order items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
