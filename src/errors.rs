//! # Error Handling
//!
//! Every handler returns `Result<_, ApiError>`. Errors render as
//! `{"success": false, "error": "<message>"}` with a matching status code.
//!
//! Database failures are logged with `tracing` and replaced by a message that
//! names the failed operation (`Failed to fetch books`), so driver errors and
//! SQL never reach the client.
//!
//! ```rust,ignore
//! let book = Book::get_one(db, id)
//!     .await
//!     .map_err(|err| ApiError::operation(Operation::FetchOne, "book", err))?;
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use std::fmt;

use crate::response::ApiResponse;

/// The storage operation a database error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    FetchOne,
    FetchMetadata,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Client-facing failure message, e.g. `Failed to create book`.
    #[must_use]
    pub fn describe(self, subject: &str) -> String {
        match self {
            Self::FetchAll | Self::FetchOne => format!("Failed to fetch {subject}"),
            Self::FetchMetadata => format!("Failed to fetch {subject} metadata"),
            Self::Create => format!("Failed to create {subject}"),
            Self::Update => format!("Failed to update {subject}"),
            Self::Delete => format!("Failed to delete {subject}"),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// 404
    NotFound { message: String },

    /// 400, a path identifier that is not a UUID
    InvalidId { resource: String },

    /// 400, malformed request body
    BadRequest { message: String },

    /// 409, unique constraint violated
    Conflict { message: String },

    /// 400, payload rejected by validation
    ValidationFailed { errors: Vec<String> },

    /// 500. `internal` is logged, never sent.
    Database { message: String, internal: DbErr },

    /// 500
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    /// `<resource> not found`
    pub fn not_found(resource: impl AsRef<str>) -> Self {
        Self::NotFound {
            message: format!("{} not found", resource.as_ref()),
        }
    }

    /// `Invalid <resource> ID`
    pub fn invalid_id(resource: impl Into<String>) -> Self {
        Self::InvalidId {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Classify a database error raised while performing `operation` on
    /// `subject`.
    ///
    /// Missing records become 404 and unique violations 409; everything else
    /// is a 500 carrying `Failed to <operation> <subject>`.
    #[must_use]
    pub fn operation(operation: Operation, subject: &str, err: DbErr) -> Self {
        match Self::from(err) {
            Self::Database { internal, .. } => Self::Database {
                message: operation.describe(subject),
                internal,
            },
            classified => classified,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidId { .. } | Self::BadRequest { .. } | Self::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The sanitized message sent to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidId { resource } => format!("Invalid {resource} ID"),
            Self::ValidationFailed { errors } => format!("Validation Error: {}", errors.join(", ")),
            Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { message, internal } => {
                tracing::error!(error = ?internal, message = %message, "Database error occurred");
            }
            Self::Internal {
                message,
                internal: Some(details),
            } => {
                tracing::error!(details = %details, message = %message, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body: ApiResponse<()> = ApiResponse::failure(self.user_message());
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` keeps its message as the 404 text, unique violations map
/// to 409 and the rest become a generic 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(message) = &err {
            return Self::NotFound {
                message: message.clone(),
            };
        }
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            tracing::debug!(error = ?err, "Unique constraint violated");
            return Self::conflict("Duplicate entry");
        }
        Self::database(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = ApiError::not_found("Book");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Book not found");
    }

    #[test]
    fn test_invalid_id() {
        let err = ApiError::invalid_id("character");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Invalid character ID");
    }

    #[test]
    fn test_validation_failed_joins_messages() {
        let err = ApiError::validation_failed(vec![
            "Path `title` is required.".to_string(),
            "Path `pages` is required.".to_string(),
        ]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.user_message(),
            "Validation Error: Path `title` is required., Path `pages` is required."
        );
    }

    #[test]
    fn test_operation_messages() {
        assert_eq!(Operation::FetchAll.describe("books"), "Failed to fetch books");
        assert_eq!(Operation::FetchOne.describe("book"), "Failed to fetch book");
        assert_eq!(
            Operation::FetchMetadata.describe("book"),
            "Failed to fetch book metadata"
        );
        assert_eq!(Operation::Create.describe("species"), "Failed to create species");
        assert_eq!(Operation::Update.describe("character"), "Failed to update character");
        assert_eq!(
            Operation::Delete.describe("point of interest"),
            "Failed to delete point of interest"
        );
    }

    #[test]
    fn test_operation_hides_database_details() {
        let err = ApiError::operation(
            Operation::FetchAll,
            "books",
            DbErr::Custom("no such table: books".to_string()),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Failed to fetch books");
    }

    #[test]
    fn test_operation_keeps_not_found() {
        let err = ApiError::operation(
            Operation::Delete,
            "book",
            DbErr::RecordNotFound("Book not found".to_string()),
        );
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Book not found");
    }

    #[test]
    fn test_dberr_conversion() {
        let api_err: ApiError = DbErr::Type("Type conversion failed".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.user_message(), "A database error occurred");
    }

    #[test]
    fn test_display_uses_user_message() {
        let err = ApiError::conflict("Duplicate entry");
        assert_eq!(format!("{err}"), "Duplicate entry");
        let _: &dyn std::error::Error = &err;
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = ApiError::not_found("Species").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Species not found" })
        );
    }
}
