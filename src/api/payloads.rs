#![allow(missing_docs)]

//! JSON request and response shapes.
//!
//! Responses mirror the database rows with foreign keys flattened to IDs.
//! Money is rendered as a string with exactly two decimal places.

use crate::{
    core::{input, order::OrderWithItems},
    entities::{cart, menu_item, order_item, user},
    errors::Error,
};
use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, PathRejection},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// `axum::Json` with rejections reported as `400 {"detail": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// `axum::extract::Path` where an unparsable segment is a 404, like an
/// unmatched route.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", rejection.body_text());
        Self::NotFound
    }
}

fn money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    serializer.serialize_str(&rounded.to_string())
}

/// A menu item as returned by the API.
#[derive(Debug, Serialize)]
pub struct MenuItemResponse {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "money")]
    pub price: Decimal,
    pub category: String,
}

impl From<menu_item::Model> for MenuItemResponse {
    fn from(model: menu_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            category: model.category,
        }
    }
}

/// A cart row as returned by the API.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: i64,
    pub user: i64,
    pub menuitem: i64,
    pub quantity: i32,
    #[serde(serialize_with = "money")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "money")]
    pub price: Decimal,
}

impl From<cart::Model> for CartResponse {
    fn from(model: cart::Model) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            menuitem: model.menuitem_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            price: model.price,
        }
    }
}

/// One line of an order.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub order: i64,
    pub menuitem: i64,
    pub quantity: i32,
    #[serde(serialize_with = "money")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "money")]
    pub price: Decimal,
}

impl From<order_item::Model> for OrderItemResponse {
    fn from(model: order_item::Model) -> Self {
        Self {
            id: model.id,
            order: model.order_id,
            menuitem: model.menuitem_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            price: model.price,
        }
    }
}

/// An order with its nested items.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub user: i64,
    pub delivery_crew: Option<i64>,
    pub status: bool,
    #[serde(serialize_with = "money")]
    pub total: Decimal,
    pub date: NaiveDate,
    pub order_items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(OrderWithItems { order, items }: OrderWithItems) -> Self {
        Self {
            id: order.id,
            user: order.user_id,
            delivery_crew: order.delivery_crew_id,
            status: order.status,
            total: order.total,
            date: order.date,
            order_items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
        }
    }
}

/// Body of `POST /auth/users/`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/token/login/`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response of `POST /auth/token/login/`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Body of the group membership `POST` endpoints.
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    #[serde(default, deserialize_with = "input::optional_id")]
    pub user_id: Option<i64>,
}

/// Body of `PATCH /orders/{id}/status/`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default, deserialize_with = "input::optional_flag")]
    pub status: Option<bool>,
}
