use std::net::SocketAddr;

use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use serde::Deserialize;
use snafu::ResultExt;
use url::Url;

use crate::auth::Authenticator;
use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

/// Service configuration read from the environment.
///
/// Numeric fields stay at the top level, flattened sections only see them as strings.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "Config::default_host_address")]
    pub host_address: SocketAddr,
    #[serde(default = "Config::default_log_dir")]
    pub log_dir: String,
    #[serde(default = "Config::default_frontend_url")]
    pub frontend_url: Url,
    #[serde(default = "Config::default_token_expiry")]
    pub access_token_expire_minutes: i64,

    pub superadmin_email: String,
    pub superadmin_password: SecretString,

    #[serde(flatten)]
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret_key: SecretString,
    #[serde(default = "AuthConfig::default_algorithm")]
    pub jwt_algorithm: Algorithm,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(
            self.auth.secret_key.clone(),
            self.auth.jwt_algorithm,
            chrono::Duration::minutes(self.access_token_expire_minutes),
        )
    }

    fn default_host_address() -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], 8000))
    }

    fn default_log_dir() -> String {
        "logs".to_string()
    }

    fn default_frontend_url() -> Url {
        Url::parse("http://localhost:5173").expect("static url is valid")
    }

    fn default_token_expiry() -> i64 {
        1440
    }
}

impl AuthConfig {
    fn default_algorithm() -> Algorithm {
        Algorithm::HS256
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SECRET_KEY", "hunter2"),
        ("SUPERADMIN_EMAIL", "root@ratebridge.test"),
        ("SUPERADMIN_PASSWORD", "toor"),
    ];

    #[test]
    fn defaults_fill_the_gaps() {
        let config: Config = envy::from_iter(vars(&REQUIRED)).unwrap();

        assert_eq!(config.host_address, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.frontend_url.as_str(), "http://localhost:5173/");
        assert_eq!(config.access_token_expire_minutes, 1440);
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.auth.secret_key.expose_secret(), "hunter2");
        assert_eq!(config.database.url.as_str(), "mem://");
        assert_eq!(config.database.namespace, "ratebridge");
        assert!(config.database.credentials.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("HOST_ADDRESS", "127.0.0.1:9000"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
            ("JWT_ALGORITHM", "HS512"),
            ("SURREAL_URL", "ws://localhost:8001"),
            ("SURREAL_USER", "root"),
            ("SURREAL_PASS", "root"),
        ]);
        let config: Config = envy::from_iter(vars(&pairs)).unwrap();

        assert_eq!(config.host_address.port(), 9000);
        assert_eq!(config.access_token_expire_minutes, 15);
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS512);
        assert_eq!(config.database.url.scheme(), "ws");
        assert_eq!(
            config.database.credentials.map(|credentials| credentials.username),
            Some("root".to_string())
        );
    }

    #[test]
    fn secret_key_is_required() {
        let pairs = vars(&REQUIRED[1..]);
        assert!(envy::from_iter::<_, Config>(pairs).is_err());
    }
}
