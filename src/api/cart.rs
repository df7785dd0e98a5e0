//! Cart endpoints, always scoped to the caller.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        payloads::{CartResponse, JsonBody},
    },
    core::cart::{self, CartInput},
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

/// `GET /cart/menu-items/`
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<CartResponse>>> {
    let rows = cart::list_cart(&state.db, current.user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// `POST /cart/menu-items/`
pub async fn add(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(input): JsonBody<CartInput>,
) -> Result<(StatusCode, Json<CartResponse>)> {
    let row = cart::add_to_cart(&state.db, current.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// `DELETE /cart/menu-items/`
pub async fn clear(State(state): State<AppState>, current: CurrentUser) -> Result<StatusCode> {
    cart::clear_cart(&state.db, current.user.id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_cart_requires_authentication() -> Result<()> {
        let (_db, app) = setup_test_app().await?;

        let (status, _) = send(&app, Method::GET, "/api/cart/menu-items/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_list_and_clear_cart() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let soup = create_custom_menu_item(&db, "Soup", "4.25").await?;
        add_test_cart_row(&db, bob.id, soup.id, 5).await?;
        let token = login_test_user(&db, "alice").await?;

        let (status, row) = send(
            &app,
            Method::POST,
            "/api/cart/menu-items/",
            Some(&token),
            Some(json!({"menuitem": soup.id, "quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(row["user"], alice.id);
        assert_eq!(row["unit_price"], "4.25");
        assert_eq!(row["price"], "8.50");

        let (status, rows) = send(&app, Method::GET, "/api/cart/menu-items/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, Method::DELETE, "/api/cart/menu-items/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, rows) = send(&app, Method::GET, "/api/cart/menu-items/", Some(&token), None).await;
        assert_eq!(rows.as_array().map(Vec::len), Some(0));

        // Bob's cart is untouched
        assert_eq!(cart::list_cart(&db, bob.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unknown_menu_item() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_test_user(&db, "alice").await?;
        let token = login_test_user(&db, "alice").await?;

        let (status, errors) = send(
            &app,
            Method::POST,
            "/api/cart/menu-items/",
            Some(&token),
            Some(json!({"menuitem": 404, "quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            errors["menuitem"][0],
            "Invalid pk \"404\" - object does not exist."
        );

        Ok(())
    }
}
