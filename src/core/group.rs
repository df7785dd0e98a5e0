//! Role group business logic.
//!
//! A user's role is decided by the name of the groups they belong to. The two
//! named roles are [`Role::Manager`] and [`Role::DeliveryCrew`]; anyone in
//! neither group is a customer.

use crate::{
    entities::{Group, User, UserGroup, group, user, user_group},
    errors::{Error, Result},
};
use sea_orm::{
    JoinType, PaginatorTrait, QueryOrder, QuerySelect, RelationTrait, Set, prelude::*,
};
use tracing::{debug, info, instrument};

/// A named role group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May manage the menu
    Manager,
    /// May see and complete the orders assigned to them
    DeliveryCrew,
}

impl Role {
    /// Every named role, in seeding order.
    pub const ALL: [Self; 2] = [Self::Manager, Self::DeliveryCrew];

    /// The group name stored in the database.
    #[must_use]
    pub const fn group_name(self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::DeliveryCrew => "Delivery crew",
        }
    }
}

/// Returns the group for `role`, creating it if missing.
#[instrument(skip(db))]
pub async fn ensure_group<C: ConnectionTrait>(db: &C, role: Role) -> Result<group::Model> {
    if let Some(existing) = Group::find()
        .filter(group::Column::Name.eq(role.group_name()))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let created = group::ActiveModel {
        name: Set(role.group_name().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created group '{}'", created.name);
    Ok(created)
}

/// Checks whether `user_id` belongs to the group for `role`.
pub async fn has_role<C: ConnectionTrait>(db: &C, user_id: i64, role: Role) -> Result<bool> {
    let count = UserGroup::find()
        .inner_join(Group)
        .filter(user_group::Column::UserId.eq(user_id))
        .filter(group::Column::Name.eq(role.group_name()))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Lists the members of the group for `role`, ordered by user ID.
pub async fn list_members(db: &DatabaseConnection, role: Role) -> Result<Vec<user::Model>> {
    User::find()
        .join(JoinType::InnerJoin, user::Relation::UserGroups.def())
        .join(JoinType::InnerJoin, user_group::Relation::Group.def())
        .filter(group::Column::Name.eq(role.group_name()))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a user to the group for `role`. Adding an existing member is a no-op.
///
/// # Errors
/// Returns [`Error::NotFound`] if `user_id` does not name a user.
#[instrument(skip(db))]
pub async fn add_member(db: &DatabaseConnection, role: Role, user_id: i64) -> Result<()> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound)?;
    let group = ensure_group(db, role).await?;

    if UserGroup::find_by_id((user.id, group.id)).one(db).await?.is_some() {
        debug!("User {} is already in '{}'", user.id, group.name);
        return Ok(());
    }

    user_group::ActiveModel {
        user_id: Set(user.id),
        group_id: Set(group.id),
    }
    .insert(db)
    .await?;
    info!("Added user {} to '{}'", user.id, group.name);
    Ok(())
}

/// Removes a user from the group for `role`. Removing a non-member succeeds.
///
/// # Errors
/// Returns [`Error::NotFound`] if `user_id` does not name a user.
#[instrument(skip(db))]
pub async fn remove_member(db: &DatabaseConnection, role: Role, user_id: i64) -> Result<()> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound)?;
    let group = ensure_group(db, role).await?;

    let result = UserGroup::delete_by_id((user.id, group.id)).exec(db).await?;
    info!(
        "Removed user {} from '{}', rows affected: {}",
        user.id, group.name, result.rows_affected
    );
    Ok(())
}
