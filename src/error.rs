//! Error types shared by the store, the importer, and the HTTP handlers.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query or transaction failure reported by diesel.
    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    /// The SQLite database could not be opened.
    #[error("Connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded workbook could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An id lookup found nothing.
    #[error("{0} not found")]
    NotFound(String),

    /// A required request field was absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request body was not the JSON the endpoint expects.
    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),

    /// A path parameter, such as a non-numeric id.
    #[error("{0}")]
    InvalidPath(#[from] PathRejection),

    /// A natural key (student id, subject code) is already taken.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// The worksheet header lacks one of the expected import columns.
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    /// A worksheet row could not be turned into an attendance entry. Rows are 1-indexed and
    /// include the header, so they match the row numbers a spreadsheet program shows.
    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Turns a unique-constraint violation into [`Error::Conflict`] describing `what`, passing
    /// every other diesel error through.
    pub(crate) fn from_unique_violation(err: DieselError, what: impl FnOnce() -> String) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Error::Conflict(what())
            }
            other => Error::Database(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MissingField(_)
            | Error::InvalidInput(_)
            | Error::InvalidBody(_)
            | Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
