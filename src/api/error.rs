use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use snafu::{Location, Snafu};

use crate::auth::AuthError;
use crate::database::DatabaseQueryError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(transparent)]
    Auth { source: AuthError },

    #[snafu(context(false), display("{}", source.body_text()))]
    InvalidBody { source: JsonRejection },

    #[snafu(context(false), display("{}", source.body_text()))]
    InvalidQuery { source: QueryRejection },

    #[snafu(display("QR code not found"))]
    QrCodeNotFound { id: String },

    #[snafu(display("QR code is inactive"))]
    QrCodeInactive { uuid: String },

    #[snafu(display("Company not found"))]
    CompanyNotFound { id: String },

    #[snafu(display("Label must not be empty"))]
    EmptyLabel,

    #[snafu(display("page must be at least 1 and page_size between 1 and {max_page_size}"))]
    InvalidPagination { max_page_size: u64 },

    #[snafu(display("database request failed at {location}: {source}"))]
    Database {
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth { source } => source.status(),
            ApiError::InvalidBody { source } => source.status(),
            ApiError::InvalidQuery { source } => source.status(),
            ApiError::QrCodeNotFound { .. } | ApiError::CompanyNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::QrCodeInactive { .. } => StatusCode::BAD_REQUEST,
            ApiError::EmptyLabel | ApiError::InvalidPagination { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Auth { source } => source.kind(),
            ApiError::InvalidBody { .. } => "InvalidBody",
            ApiError::InvalidQuery { .. } => "InvalidQuery",
            ApiError::QrCodeNotFound { .. } => "QrCodeNotFound",
            ApiError::QrCodeInactive { .. } => "QrCodeInactive",
            ApiError::CompanyNotFound { .. } => "CompanyNotFound",
            ApiError::EmptyLabel => "EmptyLabel",
            ApiError::InvalidPagination { .. } => "InvalidPagination",
            ApiError::Database { .. } => "Database",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth { source } => source.into_response(),
            ApiError::Database { .. } => {
                tracing::error!(error = %self, "request failed");
                error_response(self.status(), self.kind(), "Internal server error".to_string())
            }
            _ => {
                tracing::debug!(error = %self, "request rejected");
                error_response(self.status(), self.kind(), self.to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    detail: String,
    error: &'a str,
}

/// The JSON error shape shared by every endpoint: `{ "detail": .., "error": .. }`.
pub(crate) fn error_response(status: StatusCode, kind: &str, detail: String) -> Response {
    (status, Json(ErrorBody { detail, error: kind })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_keep_their_status() {
        let error: ApiError = AuthError::SuperAdminRequired {
            user_id: "user".to_string(),
        }
        .into();

        assert_eq!(error.status(), StatusCode::FORBIDDEN);
        assert_eq!(error.kind(), "SuperAdminRequired");
        assert_eq!(error.to_string(), "Super admin required");
    }

    #[test]
    fn not_found_maps_to_404() {
        let error = ApiError::QrCodeNotFound { id: "x".to_string() };
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
