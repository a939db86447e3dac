//! Error types for the registration service.

use crate::config::Mode;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Errors that can occur while serving registrations.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed registration payload: {0}")]
    MalformedPayload(String),

    #[error("User not found")]
    UserNotFound(String),

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A registration payload that broke one of the field rules.
///
/// Display strings are returned verbatim as the 400 response body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username required")]
    UsernameRequired,

    #[error("Password required")]
    PasswordRequired,

    #[error("favorite Club required")]
    FavoriteClubRequired,

    #[error("Username must be between 6 and 20 characters")]
    UsernameLength,

    #[error("Password must be between 8 and 36 characters")]
    PasswordLength,

    #[error("Password must contain at least one letter and one digit, and only letters and digits")]
    PasswordCharacters,

    #[error("Not a valid club")]
    InvalidClub,
}

impl RegistrationError {
    fn kind(&self) -> &'static str {
        match self {
            RegistrationError::Io(_) => "io",
            RegistrationError::Json(_) => "json",
            RegistrationError::Validation(_) => "validation",
            RegistrationError::MalformedPayload(_) => "malformed_payload",
            RegistrationError::UserNotFound(_) => "user_not_found",
            RegistrationError::OriginNotAllowed(_) => "origin_not_allowed",
            RegistrationError::Config(_) => "config",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RegistrationError::Validation(_) | RegistrationError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            RegistrationError::UserNotFound(_) => StatusCode::NOT_FOUND,
            RegistrationError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            RegistrationError::Io(_)
            | RegistrationError::Json(_)
            | RegistrationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Details of a server-side failure, attached to the 500 response so the
/// error middleware can render a body that fits the configured [`Mode`].
#[derive(Debug, Clone)]
pub(crate) struct ServerFault {
    message: String,
    kind: &'static str,
    detail: String,
}

impl ServerFault {
    pub(crate) fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn body(&self, mode: Mode) -> Value {
        if mode.is_production() {
            json!({ "error": { "message": "server error" } })
        } else {
            json!({
                "message": self.message,
                "error": { "kind": self.kind, "detail": self.detail },
            })
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            RegistrationError::Validation(_)
            | RegistrationError::MalformedPayload(_)
            | RegistrationError::UserNotFound(_) => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response(),
            RegistrationError::OriginNotAllowed(_) => status.into_response(),
            RegistrationError::Io(_) | RegistrationError::Json(_) | RegistrationError::Config(_) => {
                let fault = ServerFault {
                    message: self.to_string(),
                    kind: self.kind(),
                    detail: format!("{self:?}"),
                };
                let mut response = status.into_response();
                response.extensions_mut().insert(fault);
                response
            }
        }
    }
}
