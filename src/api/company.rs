use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use tracing::instrument;

use super::{
    ApiJson, ApiQuery, App, CompanyNotFoundSnafu, DatabaseSnafu, EmptyLabelSnafu, Pagination, QrCodeNotFoundSnafu,
    Result,
};
use crate::auth::CompanyUser;
use crate::model::{attach_labels, Company, Feedback, QrCode, Timestamp};
use crate::stats::{self, CompanyStats, Distribution, Highlights, Scope, Timeline};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Endpoints for a company user, always confined to their own company.
pub fn router() -> Router<App> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/feedback", get(feedback))
        .route("/feedback/stats", get(feedback_stats))
        .route("/feedback/highlights", get(feedback_highlights))
        .route("/feedback/timeline", get(feedback_timeline))
        .route("/qr-codes", get(list_qr_codes).post(create_qr_code))
        .route("/qr-codes/:id", get(get_qr_code).delete(delete_qr_code))
        .route("/qr-codes/:id/toggle", patch(toggle_qr_code))
}

/// A QR code together with the public link its image encodes.
#[derive(Debug, Clone, Serialize)]
pub struct QrCodeResponse {
    #[serde(flatten)]
    pub code: QrCode,
    pub link: String,
}

impl QrCodeResponse {
    fn new(code: QrCode, app: &App) -> Self {
        let link = code.link(&app.frontend_url);
        Self { code, link }
    }
}

/// The timeline has its own fixed window, so only the QR code can be narrowed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineQuery {
    pub qr_code_id: Option<String>,
}

impl From<TimelineQuery> for Scope {
    fn from(query: TimelineQuery) -> Self {
        Scope {
            qr_code_id: query.qr_code_id,
            ..Scope::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QrCodeCreate {
    pub label: String,
}

/// All of the company's feedback narrowed to `scope`, newest first, labels attached.
async fn scoped_feedback(app: &App, company_id: &str, scope: &Scope) -> Result<Vec<Feedback>> {
    let db = &app.database;
    let mut feedback = Feedback::by_company(company_id, db).await.context(DatabaseSnafu)?;
    let qr_codes = QrCode::by_company(company_id, db).await.context(DatabaseSnafu)?;
    attach_labels(&mut feedback, &qr_codes);

    Ok(scope.apply(feedback))
}

async fn owned_code(app: &App, id: &str, company_id: &str) -> Result<QrCode> {
    QrCode::owned(id, company_id, &app.database)
        .await
        .context(DatabaseSnafu)?
        .context(QrCodeNotFoundSnafu { id })
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn dashboard(State(app): State<App>, member: CompanyUser) -> Result<Json<CompanyStats>> {
    let db = &app.database;
    let company = Company::get(&member.company_id, db)
        .await
        .context(DatabaseSnafu)?
        .context(CompanyNotFoundSnafu { id: &member.company_id })?;
    let feedback = Feedback::by_company(&member.company_id, db).await.context(DatabaseSnafu)?;
    let qr_codes = QrCode::by_company(&member.company_id, db).await.context(DatabaseSnafu)?;

    Ok(Json(stats::company_stats(company, &feedback, &qr_codes)))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn feedback(
    State(app): State<App>, member: CompanyUser, ApiQuery(pagination): ApiQuery<Pagination>,
) -> Result<Json<Vec<Feedback>>> {
    let (limit, start) = pagination.window(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let db = &app.database;

    let mut feedback = Feedback::page_by_company(&member.company_id, limit, start, db)
        .await
        .context(DatabaseSnafu)?;
    let qr_codes = QrCode::by_company(&member.company_id, db).await.context(DatabaseSnafu)?;
    attach_labels(&mut feedback, &qr_codes);

    Ok(Json(feedback))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn feedback_stats(
    State(app): State<App>, member: CompanyUser, ApiQuery(scope): ApiQuery<Scope>,
) -> Result<Json<Distribution>> {
    let feedback = scoped_feedback(&app, &member.company_id, &scope).await?;
    Ok(Json(stats::distribution(&feedback)))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn feedback_highlights(
    State(app): State<App>, member: CompanyUser, ApiQuery(scope): ApiQuery<Scope>,
) -> Result<Json<Highlights>> {
    let feedback = scoped_feedback(&app, &member.company_id, &scope).await?;
    Ok(Json(stats::highlights(&feedback)))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn feedback_timeline(
    State(app): State<App>, member: CompanyUser, ApiQuery(query): ApiQuery<TimelineQuery>,
) -> Result<Json<Timeline>> {
    let feedback = scoped_feedback(&app, &member.company_id, &query.into()).await?;
    Ok(Json(stats::timeline(&feedback, Timestamp::now())))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn list_qr_codes(State(app): State<App>, member: CompanyUser) -> Result<Json<Vec<QrCodeResponse>>> {
    let codes = QrCode::by_company(&member.company_id, &app.database)
        .await
        .context(DatabaseSnafu)?;

    Ok(Json(
        codes.into_iter().map(|code| QrCodeResponse::new(code, &app)).collect(),
    ))
}

#[instrument(skip_all, fields(company_id = %member.company_id))]
async fn create_qr_code(
    State(app): State<App>, member: CompanyUser, ApiJson(request): ApiJson<QrCodeCreate>,
) -> Result<Json<QrCodeResponse>> {
    let label = request.label.trim();
    ensure!(!label.is_empty(), EmptyLabelSnafu);

    let code = QrCode::new(member.company_id, label.to_string());
    code.save(&app.database).await.context(DatabaseSnafu)?;
    tracing::info!(qr_code_id = %code.id, "created a QR code");

    Ok(Json(QrCodeResponse::new(code, &app)))
}

#[instrument(skip_all, fields(company_id = %member.company_id, qr_code_id = %id))]
async fn get_qr_code(
    State(app): State<App>, member: CompanyUser, Path(id): Path<String>,
) -> Result<Json<QrCodeResponse>> {
    let code = owned_code(&app, &id, &member.company_id).await?;
    Ok(Json(QrCodeResponse::new(code, &app)))
}

#[instrument(skip_all, fields(company_id = %member.company_id, qr_code_id = %id))]
async fn toggle_qr_code(
    State(app): State<App>, member: CompanyUser, Path(id): Path<String>,
) -> Result<Json<QrCodeResponse>> {
    let mut code = owned_code(&app, &id, &member.company_id).await?;
    code.is_active = !code.is_active;
    QrCode::set_active(&code.id, code.is_active, &app.database)
        .await
        .context(DatabaseSnafu)?;
    tracing::info!(is_active = code.is_active, "toggled a QR code");

    Ok(Json(QrCodeResponse::new(code, &app)))
}

#[instrument(skip_all, fields(company_id = %member.company_id, qr_code_id = %id))]
async fn delete_qr_code(
    State(app): State<App>, member: CompanyUser, Path(id): Path<String>,
) -> Result<StatusCode> {
    let code = owned_code(&app, &id, &member.company_id).await?;
    QrCode::remove(&code.id, &app.database).await.context(DatabaseSnafu)?;
    tracing::info!("deleted a QR code");

    Ok(StatusCode::NO_CONTENT)
}
