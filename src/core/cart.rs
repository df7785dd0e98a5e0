//! Cart business logic - the per-user list of menu items awaiting checkout.
//!
//! Each row snapshots the menu item's price when it is added:
//! `price = unit_price * quantity`.

use crate::{
    core::menu,
    entities::{Cart, cart},
    errors::{Error, FieldErrors, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields accepted when adding to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CartInput {
    /// Menu item ID
    pub menuitem: Option<i64>,
    /// Units to add
    pub quantity: Option<i32>,
}

/// Lists the cart rows owned by `user_id`, oldest first.
pub async fn list_cart<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Vec<cart::Model>> {
    Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .order_by_asc(cart::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a menu item to the user's cart, pricing the row from the current menu.
///
/// # Errors
/// Returns [`Error::Validation`] if the menu item is missing or
/// does not exist, or the quantity is missing or below 1.
#[instrument(skip(db))]
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    input: CartInput,
) -> Result<cart::Model> {
    let mut errors = FieldErrors::new();
    let quantity = match input.quantity {
        Some(quantity) if quantity >= 1 => Some(quantity),
        Some(_) => {
            errors.add("quantity", "Ensure this value is greater than or equal to 1.");
            None
        }
        None => {
            errors.add("quantity", "This field is required.");
            None
        }
    };
    let item = match input.menuitem {
        Some(menuitem_id) => {
            let found = menu::get_menu_item(db, menuitem_id).await?;
            if found.is_none() {
                errors.add(
                    "menuitem",
                    format!("Invalid pk \"{menuitem_id}\" - object does not exist."),
                );
            }
            found
        }
        None => {
            errors.add("menuitem", "This field is required.");
            None
        }
    };
    let (Some(item), Some(quantity)) = (item, quantity) else {
        return Err(Error::Validation(errors));
    };

    let unit_price = item.price;
    let row = cart::ActiveModel {
        user_id: Set(user_id),
        menuitem_id: Set(item.id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        price: Set(unit_price * Decimal::from(quantity)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "User {} added {} x menu item {} to cart (line {})",
        user_id, quantity, item.id, row.price
    );
    Ok(row)
}

/// Removes every cart row owned by `user_id`; returns how many were removed.
#[instrument(skip(db))]
pub async fn clear_cart<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64> {
    let result = Cart::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    info!(
        "Cleared cart for user {}, rows affected: {}",
        user_id, result.rows_affected
    );
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_to_cart_snapshots_price() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice").await?;
        let item = create_custom_menu_item(&db, "Pasta", "7.25").await?;

        let row = add_to_cart(
            &db,
            user.id,
            CartInput {
                menuitem: Some(item.id),
                quantity: Some(3),
            },
        )
        .await?;

        assert_eq!(row.user_id, user.id);
        assert_eq!(row.unit_price, "7.25".parse::<Decimal>().unwrap());
        assert_eq!(row.price, "21.75".parse::<Decimal>().unwrap());

        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_cart_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice").await?;

        let result = add_to_cart(
            &db,
            user.id,
            CartInput {
                menuitem: Some(42),
                quantity: Some(0),
            },
        )
        .await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("menuitem").unwrap()[0],
            "Invalid pk \"42\" - object does not exist."
        );
        assert!(errors.get("quantity").is_some());

        let result = add_to_cart(
            &db,
            user.id,
            CartInput {
                menuitem: None,
                quantity: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_is_scoped_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let item = create_test_menu_item(&db, "Soup").await?;

        add_test_cart_row(&db, alice.id, item.id, 1).await?;
        add_test_cart_row(&db, alice.id, item.id, 2).await?;
        add_test_cart_row(&db, bob.id, item.id, 1).await?;

        assert_eq!(list_cart(&db, alice.id).await?.len(), 2);
        assert_eq!(list_cart(&db, bob.id).await?.len(), 1);

        assert_eq!(clear_cart(&db, alice.id).await?, 2);
        assert!(list_cart(&db, alice.id).await?.is_empty());
        assert_eq!(list_cart(&db, bob.id).await?.len(), 1);

        Ok(())
    }
}
