use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use tracing::instrument;

use super::{ApiJson, App, CompanyNotFoundSnafu, DatabaseSnafu, QrCodeInactiveSnafu, QrCodeNotFoundSnafu, Result};
use crate::model::{Company, Feedback, QrCode, Rating};

/// The anonymous endpoints a customer reaches by scanning a code.
pub fn router() -> Router<App> {
    Router::new().route("/:uuid", get(qr_info).post(submit))
}

/// What the public feedback form shows before a customer rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodePublicInfo {
    pub uuid: String,
    pub label: String,
    pub company_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSubmit {
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
}

async fn find_code(app: &App, uuid: &str) -> Result<QrCode> {
    QrCode::by_uuid(uuid, &app.database)
        .await
        .context(DatabaseSnafu)?
        .context(QrCodeNotFoundSnafu { id: uuid })
}

#[instrument(skip_all, fields(uuid = %uuid))]
async fn qr_info(State(app): State<App>, Path(uuid): Path<String>) -> Result<Json<QrCodePublicInfo>> {
    let code = find_code(&app, &uuid).await?;
    let company = Company::get(&code.company_id, &app.database)
        .await
        .context(DatabaseSnafu)?
        .context(CompanyNotFoundSnafu { id: &code.company_id })?;

    Ok(Json(QrCodePublicInfo {
        uuid: code.uuid,
        label: code.label,
        company_name: company.name,
        is_active: code.is_active,
    }))
}

#[instrument(skip_all, fields(uuid = %uuid, rating = %submission.rating))]
async fn submit(
    State(app): State<App>, Path(uuid): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>, ApiJson(submission): ApiJson<FeedbackSubmit>,
) -> Result<Json<Feedback>> {
    let code = find_code(&app, &uuid).await?;
    ensure!(code.is_active, QrCodeInactiveSnafu { uuid });

    let comment = submission
        .comment
        .map(|comment| comment.trim().to_string())
        .filter(|comment| !comment.is_empty());
    let ip_address = connect_info.map(|ConnectInfo(address)| address.ip().to_string());

    let feedback = Feedback::new(&code, submission.rating, comment, ip_address);
    feedback.save(&app.database).await.context(DatabaseSnafu)?;
    tracing::info!(feedback_id = %feedback.id, qr_code_id = %code.id, "feedback received");

    Ok(Json(feedback))
}
