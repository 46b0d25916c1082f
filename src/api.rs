use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use snafu::ensure;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod company;
mod error;
mod extract;
mod feedback;
mod state;
mod superadmin;

pub use error::*;
pub use extract::{ApiJson, ApiQuery};
pub use feedback::{FeedbackSubmit, QrCodePublicInfo};
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// The full HTTP surface of the service.
pub fn router(app: App) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::router())
        .nest("/api/company", company::router())
        .nest("/api/feedback", feedback::router())
        .nest("/api/superadmin", superadmin::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `?page=&page_size=` query parameters, both optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl Pagination {
    /// Resolves to `(limit, start)` for the store, validating against `max_size`.
    pub fn window(self, default_size: u64, max_size: u64) -> Result<(u64, u64)> {
        let page = self.page.unwrap_or(1);
        let size = self.page_size.unwrap_or(default_size);

        ensure!(
            page >= 1 && (1..=max_size).contains(&size),
            InvalidPaginationSnafu { max_page_size: max_size }
        );

        Ok((size, (page - 1).saturating_mul(size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        assert_eq!(Pagination::default().window(20, 100).unwrap(), (20, 0));
    }

    #[test]
    fn pagination_offsets_by_page() {
        let pagination = Pagination {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(pagination.window(20, 100).unwrap(), (25, 50));
    }

    #[test]
    fn pagination_rejects_out_of_bounds() {
        let zero_page = Pagination {
            page: Some(0),
            page_size: None,
        };
        let too_large = Pagination {
            page: None,
            page_size: Some(101),
        };
        let empty = Pagination {
            page: None,
            page_size: Some(0),
        };

        assert!(zero_page.window(20, 100).is_err());
        assert!(too_large.window(20, 100).is_err());
        assert!(empty.window(20, 100).is_err());
        assert!(too_large.window(50, 200).is_ok());
    }
}
