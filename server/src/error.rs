use hyper::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

use shared::types::ErrorResponse;

use crate::auth::AuthError;
use crate::database::DbError;
use crate::database::sql::SqlError;
use crate::handlers::http::utils::json_response::{HttpResponse, deliver_error_json};

/// Everything a request can fail with, translated to a response at the
/// router boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Request body or query failed validation; one entry per problem.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SqlError> for ApiError {
    fn from(e: SqlError) -> Self {
        Self::Db(DbError::Sql(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Authentication)
            | Self::Auth(AuthError::InvalidToken(_))
            | Self::Auth(AuthError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Signing(_)) | Self::Auth(AuthError::Lookup(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Db(DbError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Db(DbError::BadRequest(_))
            | Self::Db(DbError::Sql(_))
            | Self::Validation(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Db(DbError::Sqlx(_)) | Self::Db(DbError::Hash(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::Authentication) => "INVALID_CREDENTIALS",
            Self::Auth(AuthError::InvalidToken(_)) => "INVALID_TOKEN",
            Self::Auth(AuthError::Unauthorized) => "UNAUTHORIZED",
            Self::Db(DbError::Sql(SqlError::NoUpdateData)) => "NO_DATA",
            Self::Db(DbError::Sql(SqlError::InvalidColumn(_))) => "INVALID_FIELD",
            Self::Db(DbError::NotFound(_)) | Self::NotFound(_) => "NOT_FOUND",
            Self::Db(DbError::BadRequest(_)) | Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Db(DbError::Sqlx(_)) => "DATABASE_ERROR",
            Self::Auth(AuthError::Signing(_))
            | Self::Auth(AuthError::Lookup(_))
            | Self::Db(DbError::Hash(_))
            | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message.  Server-side failures are not described.
    pub fn to_message(&self) -> String {
        if self.status().is_server_error() {
            return "An internal error occurred".to_string();
        }
        match self {
            Self::Validation(_) => "Request validation failed".to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let body = ErrorResponse::new(self.to_code(), &self.to_message());
        match self {
            Self::Validation(errors) => body.with_errors(errors.clone()),
            _ => body,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }
        deliver_error_json(&self.to_error_response(), status)
    }
}
