//! Account business logic - users, passwords and API tokens.
//!
//! Passwords are stored as argon2id PHC strings salted from the OS RNG. Tokens
//! are random UUIDs kept in the `auth_tokens` table and presented as
//! `Authorization: Token <key>`.

use crate::{
    entities::{AuthToken, User, auth_token, user},
    errors::{Error, FieldErrors, Result},
};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument};
use uuid::Uuid;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Finds a user by primary key.
pub async fn get_user_by_id<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by login name.
pub async fn get_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new user.
///
/// # Errors
/// Returns [`Error::Validation`] if the username or password is empty or the
/// username is already taken.
#[instrument(skip(db, password))]
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    is_staff: bool,
) -> Result<user::Model> {
    let username = username.trim();
    let mut errors = FieldErrors::new();
    if username.is_empty() {
        errors.add("username", "This field may not be blank.");
    }
    if password.is_empty() {
        errors.add("password", "This field may not be blank.");
    }
    errors.into_result()?;

    if get_user_by_username(db, username).await?.is_some() {
        return Err(Error::Validation(FieldErrors::single(
            "username",
            "A user with that username already exists.",
        )));
    }

    let user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.trim().to_string()),
        password_hash: Set(hash_password(password)?),
        is_staff: Set(is_staff),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered user '{}' (ID: {})", user.username, user.id);
    Ok(user)
}

/// Checks credentials and issues a new token.
///
/// # Errors
/// Returns [`Error::Validation`] with a `non_field_errors` entry when the
/// username is unknown or the password does not match.
#[instrument(skip(db, password))]
pub async fn login(db: &DatabaseConnection, username: &str, password: &str) -> Result<String> {
    let user = get_user_by_username(db, username)
        .await?
        .filter(|user| verify_password(password, &user.password_hash))
        .ok_or_else(|| {
            Error::Validation(FieldErrors::single(
                "non_field_errors",
                "Unable to log in with provided credentials.",
            ))
        })?;

    let token = auth_token::ActiveModel {
        key: Set(Uuid::new_v4().simple().to_string()),
        user_id: Set(user.id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    debug!("Issued token for user_id {}", user.id);
    Ok(token.key)
}

/// Resolves a token to its user.
pub async fn user_for_token(db: &DatabaseConnection, key: &str) -> Result<Option<user::Model>> {
    let found = AuthToken::find_by_id(key.to_string())
        .find_also_related(User)
        .one(db)
        .await?;
    Ok(found.and_then(|(_, user)| user))
}

/// Deletes a token; returns whether a token was removed.
#[instrument(skip(db, key))]
pub async fn logout(db: &DatabaseConnection, key: &str) -> Result<bool> {
    let result = AuthToken::delete_by_id(key.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
