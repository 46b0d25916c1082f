use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiJson, App, Result};
use crate::auth::{CurrentUser, TokenResponse};
use crate::model::User;

pub fn router() -> Router<App> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub company_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[instrument(skip_all, fields(email = %request.email))]
async fn register(
    State(app): State<App>, ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    let token = app
        .authenticator
        .register(&request.company_name, &request.email, &request.password, &app.database)
        .await?;

    Ok(Json(token))
}

#[instrument(skip_all, fields(email = %request.email))]
async fn login(State(app): State<App>, ApiJson(request): ApiJson<LoginRequest>) -> Result<Json<TokenResponse>> {
    let token = app
        .authenticator
        .signin(request.email.trim(), &request.password, &app.database)
        .await?;

    Ok(Json(token))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
