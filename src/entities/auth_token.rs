//! Auth token entity - An opaque API token issued at login.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    /// The token string presented in the `Authorization` header
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Owner of the token
    pub user_id: i64,
    /// When the token was issued
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each token belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
