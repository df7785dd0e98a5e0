//! Menu endpoints. Reads are public; writes require the Manager group.

use crate::{
    api::{
        AppState,
        auth::ManagerUser,
        payloads::{JsonBody, MenuItemResponse, PathParam},
    },
    core::menu::{self, MenuFilter, MenuItemInput},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

/// `GET /menu-items/`
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<MenuFilter>,
) -> Result<Json<Vec<MenuItemResponse>>> {
    let items = menu::list_menu_items(&state.db, &filter).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// `GET /menu-items/{id}/`
pub async fn detail(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MenuItemResponse>> {
    let item = menu::get_menu_item(&state.db, id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(item.into()))
}

/// `POST /menu-items/`
pub async fn create(
    State(state): State<AppState>,
    _manager: ManagerUser,
    JsonBody(input): JsonBody<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItemResponse>)> {
    let item = menu::create_menu_item(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// `PUT|PATCH /menu-items/{id}/`
pub async fn update(
    State(state): State<AppState>,
    _manager: ManagerUser,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<MenuItemInput>,
) -> Result<Json<MenuItemResponse>> {
    let item = menu::update_menu_item(&state.db, id, input).await?;
    Ok(Json(item.into()))
}

/// `DELETE /menu-items/{id}/`
pub async fn remove(
    State(state): State<AppState>,
    _manager: ManagerUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode> {
    menu::delete_menu_item(&state.db, id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::group::Role, test_utils::*};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_menu_is_public() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        let item = create_custom_menu_item(&db, "Bruschetta", "7.5").await?;

        let (status, body) = send(&app, Method::GET, "/api/menu-items/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Bruschetta");
        assert_eq!(body[0]["price"], "7.50");

        let uri = format!("/api/menu-items/{}/", item.id);
        let (status, body) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], item.id);

        let (status, body) = send(&app, Method::GET, "/api/menu-items/999/", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");

        Ok(())
    }

    #[tokio::test]
    async fn test_non_manager_cannot_write_menu() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_test_user(&db, "customer").await?;
        create_test_admin(&db, "boss").await?;
        let item = create_test_menu_item(&db, "Soup").await?;
        let uri = format!("/api/menu-items/{}/", item.id);
        let payload = json!({"name": "Cake", "price": "4.00", "category": "Desserts"});

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/menu-items/",
            None,
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Neither a plain customer nor an administrator outside the Manager group may write
        for username in ["customer", "boss"] {
            let token = login_test_user(&db, username).await?;

            let (status, body) = send(
                &app,
                Method::POST,
                "/api/menu-items/",
                Some(&token),
                Some(payload.clone()),
            )
            .await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(
                body["detail"],
                "You do not have permission to perform this action."
            );

            let (status, _) = send(
                &app,
                Method::PUT,
                &uri,
                Some(&token),
                Some(json!({"price": 1})),
            )
            .await;
            assert_eq!(status, StatusCode::FORBIDDEN);

            let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);

        Ok(())
    }

    #[tokio::test]
    async fn test_role_is_checked_before_body() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_test_user(&db, "customer").await?;
        let item = create_test_menu_item(&db, "Soup").await?;
        let uri = format!("/api/menu-items/{}/", item.id);
        let token = login_test_user(&db, "customer").await?;

        let (status, _) = send(&app, Method::PUT, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/menu-items/",
            Some(&token),
            Some(json!({"price": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() -> Result<()> {
        let (_db, app) = setup_test_app().await?;

        let (status, body) = send(&app, Method::GET, "/api/menu-items/soup/", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Not found."}));

        Ok(())
    }

    #[tokio::test]
    async fn test_manager_manages_menu() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_user_with_role(&db, "manager", Role::Manager).await?;
        let token = login_test_user(&db, "manager").await?;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/menu-items/",
            Some(&token),
            Some(json!({"name": "Cake", "price": 4.5, "category": "Desserts"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["price"], "4.50");

        let uri = format!("/api/menu-items/{}/", created["id"]);
        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"price": "5.25"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], "5.25");
        assert_eq!(updated["name"], "Cake");

        let (status, errors) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"price": "-2"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(errors["price"].is_array());

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_user_with_role(&db, "manager", Role::Manager).await?;
        let token = login_test_user(&db, "manager").await?;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/menu-items/",
            Some(&token),
            Some(json!({"name": "Cake", "price": "not money", "category": "Desserts"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        Ok(())
    }
}
