use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use snafu::ResultExt;

use ratebridge::api::{self, App};
use ratebridge::auth::bootstrap_super_admin;
use ratebridge::config::Config;
use ratebridge::database::Database;
use ratebridge::error::{
    ApplicationError, BindAddressSnafu, BootstrapSuperAdminSnafu, ConnectDatabaseSnafu, WebServerSnafu,
};
use ratebridge::logger;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let database = Database::connect(&config.database).await.context(ConnectDatabaseSnafu)?;
    bootstrap_super_admin(&config.superadmin_email, &config.superadmin_password, &database)
        .await
        .context(BootstrapSuperAdminSnafu {
            email: &config.superadmin_email,
        })?;

    let app = App::new(
        database,
        Arc::new(config.authenticator()),
        config.frontend_url.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.host_address)
        .await
        .context(BindAddressSnafu {
            address: config.host_address,
        })?;
    tracing::info!(address = %config.host_address, "listening");

    axum::serve(
        listener,
        api::router(app).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context(WebServerSnafu)
}
