//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; with none set the service runs against an
//! in-memory store seeded with the sample catalog.
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; unset selects the in-memory store)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL, used for QR targets and cookie security
//!   (default: `http://localhost:3000`)
//! - `STOREFRONT_IMAGES_DIR` - Directory served under `/images` (default: public/images)
//! - `STOREFRONT_SAMPLE_DATA` - Seed the in-memory store (default: true)
//! - `STOREFRONT_ADMIN_PASSWORD` - Bootstrap admin password for the in-memory store
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ADMIN_PASSWORD_LENGTH: usize = 12;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
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

/// Storefront application configuration.
///
/// `Debug` is derived; every credential is a `SecretString`, which prints
/// as `[REDACTED]`.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` connection URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Directory served under `/images`
    pub images_dir: PathBuf,
    /// Seed the in-memory store with the sample catalog
    pub sample_data: bool,
    /// Bootstrap admin password for the in-memory store
    pub admin_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            images_dir: PathBuf::from("public/images"),
            sample_data: true,
            admin_password: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the admin password
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("STOREFRONT_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);
        let host =
            parse_var::<IpAddr>("STOREFRONT_HOST", &get_or("STOREFRONT_HOST", "127.0.0.1"))?;
        let port = parse_var::<u16>("STOREFRONT_PORT", &get_or("STOREFRONT_PORT", "3000"))?;
        let base_url =
            normalize_base_url(&get_or("STOREFRONT_BASE_URL", "http://localhost:3000"))?;
        let images_dir = PathBuf::from(get_or("STOREFRONT_IMAGES_DIR", "public/images"));
        let sample_data = parse_bool(
            "STOREFRONT_SAMPLE_DATA",
            &get_or("STOREFRONT_SAMPLE_DATA", "true"),
        )?;

        let admin_password = lookup("STOREFRONT_ADMIN_PASSWORD")
            .map(|value| {
                validate_admin_password(&value, "STOREFRONT_ADMIN_PASSWORD")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        let sentry_sample_rate =
            parse_var::<f32>("SENTRY_SAMPLE_RATE", &get_or("SENTRY_SAMPLE_RATE", "1.0"))?;
        let sentry_traces_sample_rate = parse_var::<f32>(
            "SENTRY_TRACES_SAMPLE_RATE",
            &get_or("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            images_dir,
            sample_data,
            admin_password,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The configured database URL, for tools that cannot run in memory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no database is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Public URL a printed QR code for `batch_code` resolves to.
    #[must_use]
    pub fn batch_url(&self, batch_code: &str) -> String {
        format!("{}/batch/{batch_code}", self.base_url)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Require an absolute http(s) URL and strip any trailing slash.
fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(value.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Validate that a password is long enough and not a placeholder.
fn validate_admin_password(value: &str, var_name: &str) -> Result<(), ConfigError> {
    if value.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
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

/// Generate a random alphanumeric admin password.
#[must_use]
pub fn generate_admin_password() -> SecretString {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    SecretString::from(password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.sample_data);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/cl")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/cl"
        );

        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://primary/cl"),
            ("DATABASE_URL", "postgres://fallback/cl"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://primary/cl"
        );
    }

    #[test]
    fn test_require_database_url() {
        let config = load(&[]).unwrap();
        assert!(matches!(
            config.require_database_url(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_base_url_trailing_slash_and_batch_url() {
        let config = load(&[("STOREFRONT_BASE_URL", "https://crowelogic.com/")]).unwrap();
        assert_eq!(config.base_url, "https://crowelogic.com");
        assert!(config.secure_cookies());
        assert_eq!(
            config.batch_url("CLF001-2304"),
            "https://crowelogic.com/batch/CLF001-2304"
        );
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        assert!(load(&[("STOREFRONT_BASE_URL", "ftp://crowelogic.com")]).is_err());
        assert!(load(&[("STOREFRONT_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_sample_data_flag() {
        assert!(!load(&[("STOREFRONT_SAMPLE_DATA", "false")]).unwrap().sample_data);
        assert!(load(&[("STOREFRONT_SAMPLE_DATA", "maybe")]).is_err());
    }

    #[test]
    fn test_admin_password_validation() {
        let err = load(&[("STOREFRONT_ADMIN_PASSWORD", "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        let err = load(&[("STOREFRONT_ADMIN_PASSWORD", "changeme-please-now")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        let config = load(&[("STOREFRONT_ADMIN_PASSWORD", "Mycelium-Grows-Slowly-42")]).unwrap();
        assert!(config.admin_password.is_some());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://user:hunter22@db/cl"),
            ("STOREFRONT_ADMIN_PASSWORD", "Mycelium-Grows-Slowly-42"),
        ])
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter22"));
        assert!(!debug_output.contains("Mycelium-Grows-Slowly-42"));
    }

    #[test]
    fn test_generated_password_length() {
        let password = generate_admin_password();
        assert_eq!(password.expose_secret().len(), 24);
        assert!(password.expose_secret().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
