//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and driving the HTTP router
//! in-process.

use crate::{
    api::{self, AppState},
    config::database,
    core::{account, cart, group},
    entities::{self, order},
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables and role groups initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    database::seed(&db, None).await?;
    Ok(db)
}

/// Creates a customer with password `"password"` and an email derived from the name.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    account::create_user(
        db,
        username,
        &format!("{username}@example.com"),
        "password",
        false,
    )
    .await
}

/// Creates an administrator (`is_staff`) with password `"password"`.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    account::create_user(
        db,
        username,
        &format!("{username}@example.com"),
        "password",
        true,
    )
    .await
}

/// Creates a user and puts them in the group for `role`.
pub async fn create_user_with_role(
    db: &DatabaseConnection,
    username: &str,
    role: group::Role,
) -> Result<entities::user::Model> {
    let user = create_test_user(db, username).await?;
    group::add_member(db, role, user.id).await?;
    Ok(user)
}

/// Creates a menu item priced at 10.00 in the "Mains" category.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::menu_item::Model> {
    create_custom_menu_item(db, name, "10.00").await
}

/// Creates a menu item with a custom price given as a decimal string.
pub async fn create_custom_menu_item(
    db: &DatabaseConnection,
    name: &str,
    price: &str,
) -> Result<entities::menu_item::Model> {
    let price: Decimal = price.parse().map_err(|e| crate::errors::Error::Config {
        message: format!("bad test price {price}: {e}"),
    })?;
    entities::menu_item::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        category: Set("Mains".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Adds `quantity` units of a menu item to a user's cart.
pub async fn add_test_cart_row(
    db: &DatabaseConnection,
    user_id: i64,
    menuitem_id: i64,
    quantity: i32,
) -> Result<entities::cart::Model> {
    cart::add_to_cart(
        db,
        user_id,
        cart::CartInput {
            menuitem: Some(menuitem_id),
            quantity: Some(quantity),
        },
    )
    .await
}

/// Inserts an empty, undelivered order for `user_id` directly.
pub async fn create_test_order(db: &DatabaseConnection, user_id: i64) -> Result<order::Model> {
    order::ActiveModel {
        user_id: Set(user_id),
        delivery_crew_id: Set(None),
        status: Set(false),
        total: Set(Decimal::ZERO),
        date: Set(chrono::Utc::now().date_naive()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Logs `username` in (password `"password"`) and returns the token.
pub async fn login_test_user(db: &DatabaseConnection, username: &str) -> Result<String> {
    account::login(db, username, "password").await
}

/// Builds the full router over a fresh test database.
pub async fn setup_test_app() -> Result<(DatabaseConnection, Router)> {
    let db = setup_test_db().await?;
    let router = api::router(AppState::new(db.clone()));
    Ok((db, router))
}

/// Sends one request through the router and returns status and parsed JSON
/// body (`Value::Null` for empty bodies).
#[allow(clippy::unwrap_used)]
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
