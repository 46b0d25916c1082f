use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use snafu::ResultExt;
use tracing::instrument;

use super::{ApiQuery, App, DatabaseSnafu, Pagination, Result};
use crate::auth::SuperAdmin;
use crate::model::{attach_labels, Company, Feedback, QrCode};
use crate::stats::{company_stats, CompanyStats};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

pub fn router() -> Router<App> {
    Router::new()
        .route("/companies", get(companies))
        .route("/feedback", get(feedback))
}

#[instrument(skip_all)]
async fn companies(State(app): State<App>, _admin: SuperAdmin) -> Result<Json<Vec<CompanyStats>>> {
    let db = &app.database;
    let companies = Company::all(db).await.context(DatabaseSnafu)?;

    let mut stats = Vec::with_capacity(companies.len());
    for company in companies {
        let feedback = Feedback::by_company(&company.id, db).await.context(DatabaseSnafu)?;
        let qr_codes = QrCode::by_company(&company.id, db).await.context(DatabaseSnafu)?;
        stats.push(company_stats(company, &feedback, &qr_codes));
    }

    Ok(Json(stats))
}

#[instrument(skip_all)]
async fn feedback(
    State(app): State<App>, _admin: SuperAdmin, ApiQuery(pagination): ApiQuery<Pagination>,
) -> Result<Json<Vec<Feedback>>> {
    let (limit, start) = pagination.window(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let db = &app.database;

    let mut feedback = Feedback::page(limit, start, db).await.context(DatabaseSnafu)?;
    let qr_codes = QrCode::all(db).await.context(DatabaseSnafu)?;
    attach_labels(&mut feedback, &qr_codes);

    Ok(Json(feedback))
}
