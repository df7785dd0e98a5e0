//! Unified error type for the service.
//!
//! Every layer returns [`Result`]; the HTTP layer turns an [`Error`] into a
//! status code and a JSON body through [`IntoResponse`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Field-level validation messages, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty set of field errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if no messages have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded against `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Single-field shorthand.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// `Ok(())` when empty, otherwise [`Error::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any error reported by the database layer.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure (binding the listener, reading files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Password hashing failed.
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying hasher message
        message: String,
    },

    /// Request payload failed validation.
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Request body could not be parsed.
    #[error("{message}")]
    BadRequest {
        /// Parser message
        message: String,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// No credentials were supplied on a protected route.
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    /// The supplied token does not exist.
    #[error("Invalid token.")]
    InvalidToken,

    /// The caller is authenticated but lacks the required role.
    #[error("{message}")]
    PermissionDenied {
        /// Reason shown to the client
        message: String,
    },

    /// The requested record does not exist or is outside the caller's scope.
    #[error("Not found.")]
    NotFound,
}

impl Error {
    /// The standard denial used by every role check.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::PermissionDenied {
            message: "You do not have permission to perform this action.".to_string(),
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } | Self::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
            Self::NotAuthenticated | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::PasswordHash { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation(fields) => json!(fields),
            e if status.is_server_error() => {
                error!("Request failed: {e}");
                json!({ "detail": "Internal server error" })
            }
            e => json!({ "detail": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
