//! HTTP error responses.
//!
//! Every failure leaves the API as `{"success": false, "error": "..."}`,
//! with `details` added for validation failures.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use validator::ValidationErrors;

use crate::infrastructure::auth::CredentialError;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::{AuthError, ManagementError, ResolveError};

pub const MISSING_AUTH_HEADER: &str = "Missing or invalid auth header";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const ADMIN_REQUIRED: &str = "Admin access required";

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized(MISSING_AUTH_HEADER.into())
    }

    pub fn invalid_token() -> Self {
        Self::Forbidden(INVALID_TOKEN.into())
    }

    pub fn admin_required() -> Self {
        Self::Forbidden(ADMIN_REQUIRED.into())
    }

    /// Map a management error, naming `entity` when the record is missing.
    pub fn management(entity: &'static str) -> impl Fn(ManagementError) -> Self {
        move |e| match e {
            ManagementError::NotFound => Self::NotFound(format!("{} not found", entity)),
            other => other.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Field name to messages. Nested errors fall back to the flattened text.
fn validation_details(errors: &ValidationErrors) -> Value {
    let fields: BTreeMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, err.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();

    if fields.is_empty() {
        Value::String(errors.to_string())
    } else {
        json!(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({
                "success": false,
                "error": "Validation failed",
                "details": validation_details(&errors),
            }),
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                json!({ "success": false, "error": "Internal server error" })
            }
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => json!({ "success": false, "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => Self::NotFound("Record not found".into()),
            RepoError::Conflict(_) => {
                Self::Conflict("A record with this unique field already exists".into())
            }
            RepoError::ConstraintViolation(_) => {
                Self::BadRequest("Foreign key constraint violation".into())
            }
            RepoError::Database { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl From<ManagementError> for ApiError {
    fn from(e: ManagementError) -> Self {
        match e {
            ManagementError::NotFound => Self::NotFound("Record not found".into()),
            ManagementError::InvalidInput(message) => Self::BadRequest(message),
            ManagementError::Forbidden(message) => Self::Forbidden(message),
            ManagementError::Repo(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".into()),
            AuthError::UserExists => Self::Conflict("Username or email already exists".into()),
            // A valid signature for a user that no longer exists.
            AuthError::UserNotFound => Self::invalid_token(),
            AuthError::Credential(CredentialError::InvalidToken) => Self::invalid_token(),
            AuthError::Credential(other) => Self::Internal(other.to_string()),
            AuthError::Repo(e) => e.into(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::UnknownType(_) => Self::BadRequest(e.to_string()),
            ResolveError::Repo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn body_json(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn repo_errors_map_to_client_statuses() {
        let (status, body) = body_json(RepoError::conflict("name").into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A record with this unique field already exists");
        assert_eq!(body["success"], false);

        let (status, _) = body_json(RepoError::ConstraintViolation("fk".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = RepoError::Database {
            operation: "list_spells",
            message: "disk I/O error".into(),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn missing_records_name_the_entity() {
        let map = ApiError::management("Spell");
        let (status, body) = body_json(map(ManagementError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Spell not found");
    }

    #[tokio::test]
    async fn validation_failures_list_fields() {
        let request = grimoire_shared::LoginRequest {
            username: String::new(),
            password: "x".into(),
        };
        let errors = request.validate().expect_err("invalid");
        let (status, body) = body_json(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"]["username"][0], "Username is required");
    }

    #[tokio::test]
    async fn auth_errors_use_fixed_messages() {
        let (status, body) = body_json(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, body) = body_json(AuthError::UserExists.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username or email already exists");
    }
}
