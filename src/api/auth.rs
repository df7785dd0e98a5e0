//! Token authentication.
//!
//! [`CurrentUser`] resolves the `Authorization: Token <key>` header (or
//! `Bearer <key>`) to a user; handlers that take it are authenticated-only.
//! The `/auth` endpoints register accounts and issue or revoke tokens.

use crate::{
    api::{
        AppState,
        payloads::{JsonBody, LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    },
    core::{account, group},
    entities::user,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use sea_orm::ConnectionTrait;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user the token belongs to
    pub user: user::Model,
    /// The token presented with this request
    pub token: String,
}

impl CurrentUser {
    /// Fails with 403 unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<()> {
        if self.user.is_staff {
            Ok(())
        } else {
            Err(Error::permission_denied())
        }
    }

    /// Fails with 403 unless the caller belongs to the group for `role`.
    pub async fn require_role<C: ConnectionTrait>(&self, db: &C, role: group::Role) -> Result<()> {
        if group::has_role(db, self.user.id, role).await? {
            Ok(())
        } else {
            Err(Error::permission_denied())
        }
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key.trim()).filter(|key| !key.is_empty())
    } else {
        None
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = token_from_headers(&parts.headers).ok_or(Error::NotAuthenticated)?;
        let user = account::user_for_token(&state.db, token)
            .await?
            .ok_or(Error::InvalidToken)?;
        Ok(Self {
            user,
            token: token.to_string(),
        })
    }
}

/// An authenticated caller in the Manager group.
///
/// Rejects with 403 before any body extractor runs.
#[derive(Debug, Clone)]
pub struct ManagerUser(pub CurrentUser);

impl FromRequestParts<AppState> for ManagerUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        current.require_role(&state.db, group::Role::Manager).await?;
        Ok(Self(current))
    }
}

/// An authenticated administrator (`is_staff`).
///
/// Rejects with 403 before any body extractor runs.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        current.require_admin()?;
        Ok(Self(current))
    }
}

/// `POST /auth/users/`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = account::create_user(&state.db, &body.username, &body.email, &body.password, false)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /auth/users/me/`
pub async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(current.user.into())
}

/// `POST /auth/token/login/`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let auth_token = account::login(&state.db, &body.username, &body.password).await?;
    Ok(Json(TokenResponse { auth_token }))
}

/// `POST /auth/token/logout/`
pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> Result<StatusCode> {
    account::logout(&state.db, &current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::{HeaderValue, Method};
    use serde_json::json;

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(token_from_headers(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token"));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[tokio::test]
    async fn test_register_login_me_logout() -> Result<()> {
        let (_db, app) = setup_test_app().await?;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/users/",
            None,
            Some(json!({"username": "carol", "email": "c@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "carol");
        assert!(body.get("password_hash").is_none());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/token/login/",
            None,
            Some(json!({"username": "carol", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["auth_token"].as_str().unwrap_or_default().to_string();
        assert!(!token.is_empty());

        let (status, body) = send(&app, Method::GET, "/api/auth/users/me/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "c@example.com");

        let (status, _) = send(&app, Method::POST, "/api/auth/token/logout/", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, "/api/auth/users/me/", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid token.");

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_credentials_and_missing_token() -> Result<()> {
        let (db, app) = setup_test_app().await?;
        create_test_user(&db, "dave").await?;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/token/login/",
            None,
            Some(json!({"username": "dave", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["non_field_errors"][0],
            "Unable to log in with provided credentials."
        );

        let (status, body) = send(&app, Method::GET, "/api/auth/users/me/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["detail"],
            "Authentication credentials were not provided."
        );

        Ok(())
    }
}
