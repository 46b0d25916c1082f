use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};

use crate::api::{error_response, App};
use crate::database::{Database, DatabaseQueryError};
use crate::model::{Company, User};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    #[snafu(display("Not authenticated"))]
    MissingToken,

    #[snafu(display("Invalid token"))]
    Decode { source: jsonwebtoken::errors::Error },

    #[snafu(display("failed to encode JWT token at {location}"))]
    Encode {
        source: jsonwebtoken::errors::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("User not found"))]
    UnknownUser { user_id: String },

    #[snafu(display("Invalid credentials"))]
    InvalidCredentials { email: String },

    #[snafu(display("Email already registered"))]
    EmailTaken { email: String },

    #[snafu(display("Invalid email address"))]
    InvalidEmail { email: String },

    #[snafu(display("Password must not be empty"))]
    EmptyPassword,

    #[snafu(display("Company name must not be empty"))]
    EmptyCompanyName,

    #[snafu(display("Company user required"))]
    CompanyRequired { user_id: String },

    #[snafu(display("Super admin required"))]
    SuperAdminRequired { user_id: String },

    #[snafu(display("failed to look up accounts at {location}: {source}"))]
    Lookup {
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::Decode { .. }
            | AuthError::UnknownUser { .. }
            | AuthError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken { .. } => StatusCode::BAD_REQUEST,
            AuthError::InvalidEmail { .. }
            | AuthError::EmptyPassword
            | AuthError::EmptyCompanyName => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::CompanyRequired { .. } | AuthError::SuperAdminRequired { .. } => {
                StatusCode::FORBIDDEN
            }
            AuthError::Encode { .. } | AuthError::Lookup { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MissingToken",
            AuthError::Decode { .. } => "Decode",
            AuthError::Encode { .. } => "Encode",
            AuthError::UnknownUser { .. } => "UnknownUser",
            AuthError::InvalidCredentials { .. } => "InvalidCredentials",
            AuthError::EmailTaken { .. } => "EmailTaken",
            AuthError::InvalidEmail { .. } => "InvalidEmail",
            AuthError::EmptyPassword => "EmptyPassword",
            AuthError::EmptyCompanyName => "EmptyCompanyName",
            AuthError::CompanyRequired { .. } => "CompanyRequired",
            AuthError::SuperAdminRequired { .. } => "SuperAdminRequired",
            AuthError::Lookup { .. } => "Lookup",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "authentication failed unexpectedly");
            return error_response(status, self.kind(), "Internal server error".to_string());
        }

        error_response(status, self.kind(), self.to_string())
    }
}

/// JWT claims, `sub` is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: SecretString,
    algorithm: Algorithm,
    validation: Validation,
    expires_in: Duration,
}

impl Authenticator {
    pub fn new(secret: SecretString, algorithm: Algorithm, expires_in: Duration) -> Self {
        Self {
            secret,
            algorithm,
            validation: Validation::new(algorithm),
            expires_in,
        }
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode(token, &self.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .context(DecodeSnafu)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = jsonwebtoken::Header::new(self.algorithm);
        jsonwebtoken::encode(&header, claims, &self.encoding_key()).context(EncodeSnafu)
    }

    pub fn issue(&self, user: &User) -> Result<TokenResponse, AuthError> {
        let claims = Claims {
            sub: user.id.clone(),
            exp: (Utc::now() + self.expires_in).timestamp(),
        };

        Ok(TokenResponse {
            access_token: self.encode(&claims)?,
            token_type: "bearer".to_string(),
        })
    }
}

impl Authenticator {
    #[tracing::instrument(skip(self, password, db))]
    pub async fn signin(
        &self, email: &str, password: &str, db: &Database,
    ) -> Result<TokenResponse, AuthError> {
        let user = User::verify(email, password, db)
            .await
            .context(LookupSnafu)?
            .context(InvalidCredentialsSnafu { email })?;

        tracing::info!(user_id = %user.id, "user signed in");
        self.issue(&user)
    }

    /// Creates a company together with its first user and signs that user in.
    #[tracing::instrument(skip(self, password, db))]
    pub async fn register(
        &self, company_name: &str, email: &str, password: &str, db: &Database,
    ) -> Result<TokenResponse, AuthError> {
        let company_name = company_name.trim();
        let email = email.trim();

        if company_name.is_empty() {
            return EmptyCompanyNameSnafu.fail();
        }
        if !is_plausible_email(email) {
            return InvalidEmailSnafu { email }.fail();
        }
        if password.is_empty() {
            return EmptyPasswordSnafu.fail();
        }

        let existing = User::by_email(email, db).await.context(LookupSnafu)?;
        if existing.is_some() {
            return EmailTakenSnafu { email }.fail();
        }

        let company = Company::new(company_name.to_string());
        let user = User::new(email.to_string(), Some(company.id.clone()), false);
        create_account(&company, &user, password, db).await?;

        tracing::info!(user_id = %user.id, company_id = %company.id, "registered a new company");
        self.issue(&user)
    }
}

/// Stores the company and its first user in one transaction. Losing the unique email index to a
/// concurrent registration is reported as [AuthError::EmailTaken].
async fn create_account(
    company: &Company, user: &User, password: &str, db: &Database,
) -> Result<(), AuthError> {
    let Err(source) = user.save_with_company(company, password, db).await else {
        return Ok(());
    };

    if User::by_email(&user.email, db).await.context(LookupSnafu)?.is_some() {
        return EmailTakenSnafu { email: &user.email }.fail();
    }

    Err::<(), _>(source).context(LookupSnafu)
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Makes sure the configured super-admin account exists. Running it again is a no-op.
#[tracing::instrument(skip(password, db))]
pub async fn bootstrap_super_admin(
    email: &str, password: &SecretString, db: &Database,
) -> Result<User, DatabaseQueryError> {
    if let Some(existing) = User::by_email(email, db).await? {
        return Ok(existing);
    }

    let user = User::new(email.to_string(), None, true);
    user.save(password.expose_secret(), db).await?;
    tracing::info!(user_id = %user.id, "created the super admin account");

    Ok(user)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<App> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).context(MissingTokenSnafu)?;
        let claims = app.authenticator.decode(token)?;

        let user = User::get(&claims.sub, &app.database)
            .await
            .context(LookupSnafu)?
            .context(UnknownUserSnafu { user_id: claims.sub })?;

        Ok(CurrentUser(user))
    }
}

/// A signed-in user that belongs to a company.
#[derive(Debug, Clone)]
pub struct CompanyUser {
    pub user: User,
    pub company_id: String,
}

#[async_trait]
impl FromRequestParts<App> for CompanyUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, app).await?;
        let company_id = user
            .company_id
            .clone()
            .context(CompanyRequiredSnafu { user_id: &user.id })?;

        Ok(CompanyUser { user, company_id })
    }
}

/// A signed-in super admin.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub User);

#[async_trait]
impl FromRequestParts<App> for SuperAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, app).await?;
        if !user.is_super_admin {
            return SuperAdminRequiredSnafu { user_id: user.id }.fail();
        }

        Ok(SuperAdmin(user))
    }
}
