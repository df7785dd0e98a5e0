//! Menu business logic - Handles the restaurant's menu catalog.
//!
//! Reads are open to everyone; the HTTP layer restricts writes to the Manager
//! group before calling into this module.

use crate::{
    entities::{MenuItem, menu_item},
    errors::{Error, FieldErrors, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::LikeExpr};
use serde::Deserialize;
use tracing::{info, instrument};

/// Largest price representable in a `Decimal(6, 2)` column.
const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// Fields accepted when creating or updating a menu item.
///
/// Every field is optional so the same shape serves full and partial updates;
/// [`create_menu_item`] requires all of them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MenuItemInput {
    /// Dish name
    pub name: Option<String>,
    /// Unit price
    pub price: Option<Decimal>,
    /// Category label
    pub category: Option<String>,
}

/// Optional filters for [`list_menu_items`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MenuFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

fn validate_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
    } else if value.chars().count() > 255 {
        errors.add(field, "Ensure this field has no more than 255 characters.");
    }
}

fn validate_price(errors: &mut FieldErrors, price: Decimal) {
    if price.is_sign_negative() && !price.is_zero() {
        errors.add("price", "Ensure this value is greater than or equal to 0.");
    }
    if price.normalize().scale() > 2 {
        errors.add(
            "price",
            "Ensure that there are no more than 2 decimal places.",
        );
    }
    if price > MAX_PRICE {
        errors.add("price", "Ensure that there are no more than 6 digits in total.");
    }
}

fn validate(input: &MenuItemInput, partial: bool) -> Result<()> {
    let mut errors = FieldErrors::new();

    match &input.name {
        Some(name) => validate_text(&mut errors, "name", name),
        None if !partial => errors.add("name", "This field is required."),
        None => {}
    }
    match input.price {
        Some(price) => validate_price(&mut errors, price),
        None if !partial => errors.add("price", "This field is required."),
        None => {}
    }
    match &input.category {
        Some(category) => validate_text(&mut errors, "category", category),
        None if !partial => errors.add("category", "This field is required."),
        None => {}
    }

    errors.into_result()
}

const LIKE_ESCAPE: char = '|';

/// Makes `%`, `_` and `|` match literally inside a `LIKE ... ESCAPE '|'` pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Lists menu items ordered by ID, optionally filtered by category or name.
pub async fn list_menu_items(
    db: &DatabaseConnection,
    filter: &MenuFilter,
) -> Result<Vec<menu_item::Model>> {
    let mut query = MenuItem::find();
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.filter(menu_item::Column::Category.eq(category));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        query = query
            .filter(menu_item::Column::Name.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)));
    }

    query
        .order_by_asc(menu_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a menu item by ID.
pub async fn get_menu_item<C: ConnectionTrait>(
    db: &C,
    menu_item_id: i64,
) -> Result<Option<menu_item::Model>> {
    MenuItem::find_by_id(menu_item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a menu item after validating every field.
///
/// # Errors
/// Returns [`Error::Validation`] if a field is missing, blank, or the price is
/// negative or does not fit two decimal places.
#[instrument(skip(db))]
pub async fn create_menu_item(
    db: &DatabaseConnection,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    validate(&input, false)?;

    let item = menu_item::ActiveModel {
        name: Set(input.name.unwrap_or_default().trim().to_string()),
        price: Set(input.price.unwrap_or_default()),
        category: Set(input.category.unwrap_or_default().trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Added menu item '{}' (ID: {}) at {}",
        item.name, item.id, item.price
    );
    Ok(item)
}

/// Applies the fields present in `input` to an existing menu item.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown ID and [`Error::Validation`] for
/// invalid field values.
#[instrument(skip(db))]
pub async fn update_menu_item(
    db: &DatabaseConnection,
    menu_item_id: i64,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    let existing = get_menu_item(db, menu_item_id)
        .await?
        .ok_or(Error::NotFound)?;
    validate(&input, true)?;
    if input.name.is_none() && input.price.is_none() && input.category.is_none() {
        return Ok(existing);
    }

    let mut item: menu_item::ActiveModel = existing.into();
    if let Some(name) = input.name {
        item.name = Set(name.trim().to_string());
    }
    if let Some(price) = input.price {
        item.price = Set(price);
    }
    if let Some(category) = input.category {
        item.category = Set(category.trim().to_string());
    }

    let updated = item.update(db).await?;
    info!("Updated menu item {}", updated.id);
    Ok(updated)
}

/// Deletes a menu item. Cart rows and order items referencing it go with it.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown ID.
#[instrument(skip(db))]
pub async fn delete_menu_item(db: &DatabaseConnection, menu_item_id: i64) -> Result<()> {
    let result = MenuItem::delete_by_id(menu_item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound);
    }
    info!("Deleted menu item {}", menu_item_id);
    Ok(())
}
