//! User-group membership entity - join table for the User <-> Group relation.
//!
//! The composite primary key guarantees at most one row per (user, group) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_groups")]
pub struct Model {
    /// Member
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Group joined
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,
}

/// Defines relationships between `UserGroup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// The group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
