use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use snafu::{Location, ResultExt, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::opt::IntoQuery;
use surrealdb::Surreal;
use tracing::instrument;
use url::Url;

/// Helper for executing SurrealQL with bound parameters.
pub mod query;

/// Macros for defining table methods.
pub mod macros;

pub use query::{DatabaseQueryError, Query};

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

const SCHEMA: &str = include_str!("../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseError {
    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    DatabaseConnection {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot sign in to `{url}` as `{username}` at {location}: {source}"))]
    DatabaseSignIn {
        url: Url,
        username: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot use namespace `{namespace}` and database `{database}` at {location}: {source}"))]
    SelectDatabase {
        namespace: String,
        database: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to apply the schema at {location}: {source}"))]
    ApplySchema {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url", default = "DatabaseConfig::default_url")]
    pub url: Url,
    #[serde(rename = "surreal_ns", default = "DatabaseConfig::default_name")]
    pub namespace: String,
    #[serde(rename = "surreal_db", default = "DatabaseConfig::default_name")]
    pub database: String,
    #[serde(flatten)]
    pub credentials: Option<DatabaseCredentials>,
}

impl DatabaseConfig {
    /// A throwaway in-memory datastore, every connection gets its own.
    pub fn memory() -> Self {
        Self {
            url: Self::default_url(),
            namespace: Self::default_name(),
            database: Self::default_name(),
            credentials: None,
        }
    }

    fn default_url() -> Url {
        Url::parse("mem://").expect("static url is valid")
    }

    fn default_name() -> String {
        "ratebridge".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseCredentials {
    #[serde(rename = "surreal_user")]
    pub username: String,
    #[serde(rename = "surreal_pass")]
    pub password: SecretString,
}

/// A cloneable handle to the rating store.
///
/// Cloning is cheap, the underlying client is reference counted. The handle is passed
/// explicitly to whoever needs it instead of living in a global.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Connects, signs in when credentials are configured, selects the namespace and
    /// database, then applies the bundled schema.
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = &config.url;
        let database = surrealdb::engine::any::connect(url.as_str())
            .await
            .context(DatabaseConnectionSnafu { url: url.clone() })?;

        if let Some(credentials) = &config.credentials {
            database
                .signin(Root {
                    username: &credentials.username,
                    password: credentials.password.expose_secret(),
                })
                .await
                .context(DatabaseSignInSnafu {
                    url: url.clone(),
                    username: &credentials.username,
                })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(SelectDatabaseSnafu {
                namespace: &config.namespace,
                database: &config.database,
            })?;

        database
            .query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .context(ApplySchemaSnafu)?;

        tracing::info!(namespace = %config.namespace, database = %config.database, "connected to the database");

        Ok(Self { database })
    }

    /// Create a builder to execute arbitrary SurrealQL on the database.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let rows: Vec<Feedback> = db
    ///     .sql("SELECT * FROM feedbacks WHERE company_id = $company_id")
    ///     .bind(("company_id", company_id))
    ///     .fetch()
    ///     .await?;
    /// ```
    pub fn sql(&self, query: impl IntoQuery) -> Query<'_> {
        Query::new(self.database.query(query))
    }
}
