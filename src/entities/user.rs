//! User entity - An account that can authenticate against the API.
//!
//! A user's role comes from group membership (see [`super::user_group`]);
//! `is_staff` marks administrators who may manage orders and groups.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across all users
    #[sea_orm(unique)]
    pub username: String,
    /// Contact address, may be empty
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Administrator flag
    pub is_staff: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Group memberships of this user
    #[sea_orm(has_many = "super::user_group::Entity")]
    UserGroups,
    /// Issued authentication tokens
    #[sea_orm(has_many = "super::auth_token::Entity")]
    AuthTokens,
    /// Cart rows owned by this user
    #[sea_orm(has_many = "super::cart::Entity")]
    Carts,
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroups.def()
    }
}

impl Related<super::auth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
