//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_BASE_URL` - Public URL for the site (`https://` enables secure cookies)
//! - `SUPABASE_URL` - Hosted backend project URL (e.g., https://xyz.supabase.co)
//! - `SUPABASE_ANON_KEY` - Public (anon) API key for the data and auth APIs
//! - `ADMIN_USERNAME` - Dashboard login username
//! - `ADMIN_PASSWORD` - Dashboard login password
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Hosted data/auth API configuration
    pub store: StoreConfig,
    /// Dashboard credentials
    pub admin: AdminCredentials,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Hosted backend (data API + auth API) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL; the REST API lives under `/rest/v1`, auth under `/auth/v1`
    pub url: Url,
    /// Public anon key sent as `apikey` and bearer token
    pub anon_key: SecretString,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// The fixed dashboard credential pair.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?;

        let store = StoreConfig::from_env()?;
        let admin = AdminCredentials::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            store,
            admin,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl StoreConfig {
    /// Load only the hosted backend settings (used by the CLI as well).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SUPABASE_URL` or `SUPABASE_ANON_KEY` is missing
    /// or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let raw_url = get_required_env("SUPABASE_URL")?;
        let url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        let anon_key = get_validated_secret("SUPABASE_ANON_KEY")?;

        Ok(Self { url, anon_key })
    }
}

impl AdminCredentials {
    fn from_env() -> Result<Self, ConfigError> {
        let username = get_required_env("ADMIN_USERNAME")?;
        let password = get_required_secret("ADMIN_PASSWORD")?;
        if username.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_USERNAME".to_string(),
                "must not be empty".to_string(),
            ));
        }
        if password.expose_secret().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PASSWORD".to_string(),
                "must not be empty".to_string(),
            ));
        }
        Ok(Self { username, password })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional sampling rate in `[0.0, 1.0]`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Reject values that are obviously copied from a template.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_not_placeholder(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> SiteConfig {
        SiteConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            store: StoreConfig {
                url: Url::parse("https://project.supabase.co").unwrap(),
                anon_key: SecretString::from("super_secret_anon_key"),
            },
            admin: AdminCredentials {
                username: "admin".to_string(),
                password: SecretString::from("super_secret_password"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_placeholder_rejected() {
        let result = validate_not_placeholder("your-anon-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
        assert!(validate_not_placeholder("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_real_key_accepted() {
        let result = validate_not_placeholder("eyJhbGciOiJIUzI1NiJ9.eyJyb2xlIjoiYW5vbiJ9.k3y", "TEST");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("http://localhost:3000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_production_follows_scheme() {
        assert!(!test_config("http://localhost:3000").is_production());
        assert!(test_config("https://elatechem.com").is_production());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config("http://localhost:3000"));

        assert!(debug_output.contains("project.supabase.co"));
        assert!(debug_output.contains("admin"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
