//! Order business logic - checkout and fulfillment tracking.
//!
//! Checkout turns the caller's cart into one order plus one order item per cart
//! row and empties the cart. All of that runs inside a single database
//! transaction: either every row is written and the cart is cleared, or
//! nothing changes.

use crate::{
    core::{account, cart, input},
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, FieldErrors, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Select, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithItems {
    /// The order row
    pub order: order::Model,
    /// Its items, ordered by ID
    pub items: Vec<order_item::Model>,
}

/// Writable order fields. Absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OrderPatch {
    /// Delivered flag
    #[serde(default, deserialize_with = "input::optional_flag")]
    pub status: Option<bool>,
    /// `Some(None)` unassigns the delivery crew
    #[serde(default, deserialize_with = "input::nullable_id")]
    pub delivery_crew: Option<Option<i64>>,
}

async fn load_with_items(
    db: &DatabaseConnection,
    query: Select<Order>,
) -> Result<Vec<OrderWithItems>> {
    let rows = query
        .order_by_asc(order::Column::Id)
        .find_with_related(OrderItem)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(order, items)| OrderWithItems { order, items })
        .collect())
}

async fn attach_items<C: ConnectionTrait>(db: &C, order: order::Model) -> Result<OrderWithItems> {
    let items = order
        .find_related(OrderItem)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(OrderWithItems { order, items })
}

/// Converts the user's cart into an order.
///
/// # Errors
/// Returns [`Error::EmptyCart`] if the user has nothing in their cart; no rows
/// are written in that case.
#[instrument(skip(db))]
pub async fn place_order(db: &DatabaseConnection, user_id: i64) -> Result<OrderWithItems> {
    let txn = db.begin().await?;

    let rows = cart::list_cart(&txn, user_id).await?;
    if rows.is_empty() {
        debug!("User {} attempted checkout with an empty cart", user_id);
        return Err(Error::EmptyCart);
    }

    let total: Decimal = rows.iter().map(|row| row.price).sum();
    let order = order::ActiveModel {
        user_id: Set(user_id),
        delivery_crew_id: Set(None),
        status: Set(false),
        total: Set(total),
        date: Set(chrono::Utc::now().date_naive()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            menuitem_id: Set(row.menuitem_id),
            quantity: Set(row.quantity),
            unit_price: Set(row.unit_price),
            price: Set(row.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    cart::clear_cart(&txn, user_id).await?;
    txn.commit().await?;

    info!(
        "User {} placed order {} with {} items, total {}",
        user_id,
        order.id,
        items.len(),
        order.total
    );
    Ok(OrderWithItems { order, items })
}

/// Every order, for administrators.
pub async fn list_all_orders(db: &DatabaseConnection) -> Result<Vec<OrderWithItems>> {
    load_with_items(db, Order::find()).await
}

/// Orders placed by `user_id`.
pub async fn list_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<OrderWithItems>> {
    load_with_items(db, Order::find().filter(order::Column::UserId.eq(user_id))).await
}

/// Orders assigned to the delivery crew member `crew_id`.
pub async fn list_orders_for_crew(
    db: &DatabaseConnection,
    crew_id: i64,
) -> Result<Vec<OrderWithItems>> {
    load_with_items(
        db,
        Order::find().filter(order::Column::DeliveryCrewId.eq(crew_id)),
    )
    .await
}

async fn find_order(db: &DatabaseConnection, query: Select<Order>) -> Result<order::Model> {
    query.one(db).await?.ok_or(Error::NotFound)
}

/// Any order by ID.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<OrderWithItems> {
    let order = find_order(db, Order::find_by_id(order_id)).await?;
    attach_items(db, order).await
}

/// An order by ID, only if it was placed by `user_id`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist or belongs to
/// another user.
pub async fn get_order_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<OrderWithItems> {
    let order = find_order(
        db,
        Order::find_by_id(order_id).filter(order::Column::UserId.eq(user_id)),
    )
    .await?;
    attach_items(db, order).await
}

async fn apply_patch(
    db: &DatabaseConnection,
    existing: order::Model,
    patch: OrderPatch,
) -> Result<OrderWithItems> {
    if let Some(Some(crew_id)) = patch.delivery_crew {
        if account::get_user_by_id(db, crew_id).await?.is_none() {
            return Err(Error::Validation(FieldErrors::single(
                "delivery_crew",
                format!("Invalid pk \"{crew_id}\" - object does not exist."),
            )));
        }
    }

    if patch.status.is_none() && patch.delivery_crew.is_none() {
        return attach_items(db, existing).await;
    }

    let mut order: order::ActiveModel = existing.into();
    if let Some(status) = patch.status {
        order.status = Set(status);
    }
    if let Some(crew) = patch.delivery_crew {
        order.delivery_crew_id = Set(crew);
    }

    let updated = order.update(db).await?;
    info!(
        "Updated order {}: status={}, delivery_crew={:?}",
        updated.id, updated.status, updated.delivery_crew_id
    );
    attach_items(db, updated).await
}

/// Partially updates any order, for administrators.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown order and [`Error::Validation`]
/// if `delivery_crew` names a user that does not exist.
#[instrument(skip(db))]
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    patch: OrderPatch,
) -> Result<OrderWithItems> {
    let existing = find_order(db, Order::find_by_id(order_id)).await?;
    apply_patch(db, existing, patch).await
}

/// Partially updates one of the caller's own orders.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist or belongs to
/// another user, and [`Error::Validation`] for an unknown delivery crew.
#[instrument(skip(db))]
pub async fn update_order_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    patch: OrderPatch,
) -> Result<OrderWithItems> {
    let existing = find_order(
        db,
        Order::find_by_id(order_id).filter(order::Column::UserId.eq(user_id)),
    )
    .await?;
    apply_patch(db, existing, patch).await
}

/// Sets the delivered flag on an order assigned to `crew_id`.
///
/// `None` keeps the current status.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist or is assigned to
/// someone else (or nobody).
#[instrument(skip(db))]
pub async fn set_status_as_crew(
    db: &DatabaseConnection,
    crew_id: i64,
    order_id: i64,
    status: Option<bool>,
) -> Result<order::Model> {
    let existing = find_order(
        db,
        Order::find_by_id(order_id).filter(order::Column::DeliveryCrewId.eq(crew_id)),
    )
    .await?;

    let Some(status) = status else {
        return Ok(existing);
    };

    let mut order: order::ActiveModel = existing.into();
    order.status = Set(status);
    let updated = order.update(db).await?;
    info!(
        "Delivery crew {} set order {} status to {}",
        crew_id, updated.id, updated.status
    );
    Ok(updated)
}

/// Deletes an order and its items.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    let result = Order::delete_by_id(order_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound);
    }

    txn.commit().await?;
    info!("Deleted order {}", order_id);
    Ok(())
}
