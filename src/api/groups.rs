//! Group membership endpoints, mounted once per [`Role`].
//!
//! All of them are administrator-only.

use crate::{
    api::{
        AppState,
        auth::AdminUser,
        payloads::{JsonBody, MemberRequest, PathParam, UserResponse},
    },
    core::group::{self, Role},
    errors::{Error, FieldErrors, Result},
};
use axum::{Json, extract::State, http::StatusCode};

/// `GET /groups/{role}/users/`
pub async fn list_members(
    State(state): State<AppState>,
    _admin: AdminUser,
    role: Role,
) -> Result<Json<Vec<UserResponse>>> {
    let members = group::list_members(&state.db, role).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// `POST /groups/{role}/users/`
pub async fn add_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<MemberRequest>,
    role: Role,
) -> Result<StatusCode> {
    let Some(user_id) = body.user_id else {
        return Err(Error::Validation(FieldErrors::single(
            "user_id",
            "This field is required.",
        )));
    };
    group::add_member(&state.db, role, user_id).await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /groups/{role}/users/{user_id}/`
pub async fn remove_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(user_id): PathParam<i64>,
    role: Role,
) -> Result<StatusCode> {
    group::remove_member(&state.db, role, user_id).await?;
    Ok(StatusCode::OK)
}
