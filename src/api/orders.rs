//! Order endpoints.
//!
//! - Customers: `/orders/` and `/orders/{id}/`, limited to their own orders.
//! - Administrators: `/orders/all/...`, unrestricted.
//! - Delivery crew: `/orders/delivery-crew/` and `/orders/{id}/status/`,
//!   limited to the orders assigned to them.

use crate::{
    api::{
        AppState,
        auth::{AdminUser, CurrentUser},
        payloads::{JsonBody, OrderResponse, PathParam, StatusRequest},
    },
    core::order::{self, OrderPatch, OrderWithItems},
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

fn to_responses(orders: Vec<OrderWithItems>) -> Json<Vec<OrderResponse>> {
    Json(orders.into_iter().map(Into::into).collect())
}

/// `GET /orders/`
pub async fn list_own(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = order::list_orders_for_user(&state.db, current.user.id).await?;
    Ok(to_responses(orders))
}

/// `POST /orders/` - checkout
pub async fn place(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let placed = order::place_order(&state.db, current.user.id).await?;
    Ok((StatusCode::CREATED, Json(placed.into())))
}

/// `GET /orders/{id}/`
pub async fn detail_own(
    State(state): State<AppState>,
    current: CurrentUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<OrderResponse>> {
    let found = order::get_order_for_user(&state.db, current.user.id, id).await?;
    Ok(Json(found.into()))
}

/// `PUT|PATCH /orders/{id}/`
pub async fn update_own(
    State(state): State<AppState>,
    current: CurrentUser,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<OrderPatch>,
) -> Result<Json<OrderResponse>> {
    let updated = order::update_order_for_user(&state.db, current.user.id, id, patch).await?;
    Ok(Json(updated.into()))
}

/// `GET /orders/all/`
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = order::list_all_orders(&state.db).await?;
    Ok(to_responses(orders))
}

/// `GET /orders/all/{id}/`
pub async fn detail_any(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<OrderResponse>> {
    let found = order::get_order(&state.db, id).await?;
    Ok(Json(found.into()))
}

/// `PUT|PATCH /orders/all/{id}/`
pub async fn update_any(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<OrderPatch>,
) -> Result<Json<OrderResponse>> {
    let updated = order::update_order(&state.db, id, patch).await?;
    Ok(Json(updated.into()))
}

/// `DELETE /orders/all/{id}/`
pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode> {
    order::delete_order(&state.db, id).await?;
    Ok(StatusCode::OK)
}

/// `GET /orders/delivery-crew/`
pub async fn list_assigned(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = order::list_orders_for_crew(&state.db, current.user.id).await?;
    Ok(to_responses(orders))
}

/// `PATCH /orders/{id}/status/`
pub async fn set_status(
    State(state): State<AppState>,
    current: CurrentUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<StatusRequest>,
) -> Result<StatusCode> {
    order::set_status_as_crew(&state.db, current.user.id, id, body.status).await?;
    Ok(StatusCode::OK)
}
