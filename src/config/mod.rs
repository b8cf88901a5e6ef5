//! Process-wide configuration.
//!
//! Built once at startup from environment variables and handed to every
//! component by reference. Nothing reads the environment after this point.

mod error;


use std::env;
use std::fmt;

use reqwest::Url;
use sentry::types::Dsn;

pub use error::{ConfigError, ConfigResult};

/// Default OpenMetadata location when no host variable is set.
pub const DEFAULT_OPENMETADATA_HOST: &str = "http://localhost:8585";

/// Minimum accepted length for the token signing secret.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
const DEFAULT_GOOGLE_REDIRECT_URI: &str = "http://localhost:8000/auth/google/callback";
const DEFAULT_TRACES_SAMPLE_RATE: f32 = 0.1;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8080,http://localhost:8585";

/// Credentials used against the upstream OpenMetadata API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A pre-issued JWT sent as a bearer token.
    Token(String),
    /// Username/password exchanged for a JWT at `/api/v1/users/login`.
    Login { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Upstream OpenMetadata connection settings.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Host URL without trailing slash, e.g. `http://localhost:8585`
    pub host: String,
    pub credentials: Credentials,
}

impl UpstreamConfig {
    /// Base URL of the versioned REST API.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.host)
    }
}

/// Google OAuth client settings.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Gateway authentication settings.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// HS256 signing secret for issued tokens
    pub secret_key: Option<String>,
    pub token_ttl_minutes: i64,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub google: Option<GoogleConfig>,
    /// Lowercased email domains allowed to log in through OAuth
    pub allowed_domains: Option<Vec<String>>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_header", &self.api_key_header)
            .field("admin_username", &self.admin_username)
            .field("google", &self.google.as_ref().map(|g| &g.client_id))
            .field("allowed_domains", &self.allowed_domains)
            .finish()
    }
}

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::InvalidValue {
                name: "LOG_LEVEL".to_string(),
                value: s.to_string(),
                help: "Use one of DEBUG, INFO, WARNING, ERROR, CRITICAL".to_string(),
            }),
        }
    }
}

/// Logging and error-reporting settings.
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub log_level: LogLevel,
    pub structured_logging: bool,
    /// Sentry project DSN; error reporting is off without it
    pub sentry_dsn: Option<Dsn>,
    pub environment: String,
    /// Fraction of transactions sent to Sentry, 0.0 to 1.0
    pub traces_sample_rate: f32,
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub auth: AuthConfig,
    pub monitoring: MonitoringConfig,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("OPENMETADATA_HOST")
            .or_else(|| get("OPENMETADATA_HOST_PORT"))
            .unwrap_or_else(|| DEFAULT_OPENMETADATA_HOST.to_string());
        let host = normalize_host(&host)?;

        let credentials = match (
            get("OPENMETADATA_JWT_TOKEN"),
            get("OPENMETADATA_USERNAME"),
            get("OPENMETADATA_PASSWORD"),
        ) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Login { username, password },
            _ => return Err(ConfigError::MissingCredentials),
        };

        let token_ttl_minutes = match get("JWT_ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => parse_positive(&raw, "JWT_ACCESS_TOKEN_EXPIRE_MINUTES")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_uri: get("GOOGLE_REDIRECT_URI")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_REDIRECT_URI.to_string()),
            }),
            _ => None,
        };

        let auth = AuthConfig {
            secret_key: get("SECRET_KEY").or_else(|| get("JWT_SECRET_KEY")),
            token_ttl_minutes,
            api_key: get("API_KEY"),
            api_key_header: get("API_KEY_HEADER")
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            admin_username: get("ADMIN_USERNAME"),
            admin_password: get("ADMIN_PASSWORD"),
            google,
            allowed_domains: get("OAUTH_ALLOWED_DOMAINS").map(|raw| {
                split_list(&raw)
                    .into_iter()
                    .map(|d| d.to_ascii_lowercase())
                    .collect()
            }),
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse()?,
            None => LogLevel::Info,
        };

        let structured_logging = match get("STRUCTURED_LOGGING") {
            Some(raw) => parse_bool(&raw, "STRUCTURED_LOGGING")?,
            None => false,
        };

        let sentry_dsn = get("SENTRY_DSN")
            .map(|raw| {
                raw.trim().parse::<Dsn>().map_err(|_| ConfigError::InvalidValue {
                    name: "SENTRY_DSN".to_string(),
                    value: raw.clone(),
                    help: "Use the DSN from the Sentry project settings".to_string(),
                })
            })
            .transpose()?;

        let traces_sample_rate = match get("SENTRY_TRACES_SAMPLE_RATE") {
            Some(raw) => parse_rate(&raw, "SENTRY_TRACES_SAMPLE_RATE")?,
            None => DEFAULT_TRACES_SAMPLE_RATE,
        };

        let monitoring = MonitoringConfig {
            log_level,
            structured_logging,
            sentry_dsn,
            environment: get("SENTRY_ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            traces_sample_rate,
        };

        let cors_origins =
            split_list(&get("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()));

        Ok(Self {
            upstream: UpstreamConfig { host, credentials },
            auth,
            monitoring,
            cors_origins,
        })
    }

    /// Check that authentication can actually be enforced.
    ///
    /// With `require_auth` the signing secret becomes mandatory; a configured
    /// secret must always meet the minimum length.
    pub fn validate_auth(&self, require_auth: bool) -> ConfigResult<()> {
        match &self.auth.secret_key {
            Some(secret) if secret.chars().count() < MIN_SECRET_LEN => {
                Err(ConfigError::SecretTooShort {
                    min: MIN_SECRET_LEN,
                })
            }
            None if require_auth => Err(ConfigError::MissingSecret),
            _ => Ok(()),
        }
    }

    /// Override the signing secret.
    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.auth.secret_key = Some(secret.into());
        self
    }
}

fn normalize_host(raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: &str| ConfigError::InvalidHost {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host name"));
    }
    Ok(trimmed.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str, name: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            help: "Use true or false".to_string(),
        }),
    }
}

fn parse_rate(raw: &str, name: &str) -> ConfigResult<f32> {
    match raw.trim().parse::<f32>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(v),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            help: "Use a number between 0.0 and 1.0".to_string(),
        }),
    }
}

fn parse_positive(raw: &str, name: &str) -> ConfigResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            help: "Use a positive whole number".to_string(),
        }),
    }
}
