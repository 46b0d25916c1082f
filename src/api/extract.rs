use axum::extract::{FromRequest, FromRequestParts};

use super::ApiError;

/// JSON request body whose rejection is reported through [ApiError].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection is reported through [ApiError].
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
