//! Group entity - A named role such as "Manager" or "Delivery crew".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group name; the role checks match on this
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Group and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Memberships of this group
    #[sea_orm(has_many = "super::user_group::Entity")]
    UserGroups,
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
