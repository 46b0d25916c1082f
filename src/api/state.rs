use std::sync::Arc;

use derive_new::new;
use url::Url;

use crate::auth::Authenticator;
use crate::database::Database;

/// Everything a request handler needs, handed to the router once at startup.
#[derive(Debug, Clone, new)]
pub struct App {
    pub database: Database,
    pub authenticator: Arc<Authenticator>,
    pub frontend_url: Url,
}
