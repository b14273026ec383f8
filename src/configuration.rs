use chrono::Duration;
use config::ConfigError;

use crate::auth::DEFAULT_REFRESH_TOKEN_TTL_DAYS;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;
const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 24 * 3600;
const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Keep users and refresh tokens in process memory instead of Postgres.
    #[serde(default)]
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Signing secret, webhook API key and token lifetimes.
///
/// Read once at startup; never reloaded.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub api_key: String,
    #[serde(default = "default_access_token_ttl_seconds")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
}

fn default_access_token_ttl_seconds() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS
}

fn default_refresh_token_ttl_days() -> i64 {
    DEFAULT_REFRESH_TOKEN_TTL_DAYS
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            api_key: api_key.into(),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_ttl_seconds)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret is required".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Message("auth.api_key is required".to_string()));
        }
        if self.access_token_ttl_seconds <= 0 || self.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.access_token_ttl_seconds > MAX_ACCESS_TOKEN_TTL_SECONDS {
            return Err(ConfigError::Message(format!(
                "auth.access_token_ttl_seconds must not exceed {}",
                MAX_ACCESS_TOKEN_TTL_SECONDS
            )));
        }
        if self.refresh_token_ttl_days > MAX_REFRESH_TOKEN_TTL_DAYS {
            return Err(ConfigError::Message(format!(
                "auth.refresh_token_ttl_days must not exceed {}",
                MAX_REFRESH_TOKEN_TTL_DAYS
            )));
        }
        Ok(())
    }
}

/// Load `configuration.yaml` (optional) overlaid with `APP_` environment
/// variables, e.g. `APP_AUTH__JWT_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}
