//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOOD_APP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - HS256 signing key (min 32 chars, high entropy)
//! - `JWT_ISSUER` - Issuer written to and required in every token
//! - `JWT_AUDIENCE` - Audience written to and required in every token
//! - `CLOUDINARY_CLOUD_NAME` - Cloudinary cloud name
//! - `CLOUDINARY_API_KEY` - Cloudinary API key
//! - `CLOUDINARY_API_SECRET` - Cloudinary API secret
//!
//! ## Optional
//! - `FOOD_APP_HOST` - Bind address (default: 127.0.0.1)
//! - `FOOD_APP_PORT` - Listen port (default: 8080)
//! - `JWT_TTL_MINUTES` - Token lifetime (default: 60)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins, `*` for any (default: *)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Substrings that mark a secret as a template value (matched lower-cased).
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

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// Image hosting credentials
    pub cloudinary: CloudinaryConfig,
    /// Allowed CORS origins
    pub cors: CorsOrigins,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
}

/// JWT signing configuration.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of an issued token, in minutes
    pub ttl_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Cloudinary account credentials.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse the `CORS_ALLOWED_ORIGINS` value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let origins: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

impl ApiConfig {
    /// Read the server configuration, loading `.env` first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing or unparsable variable, or a
    /// secret that looks like a placeholder or has too little entropy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FOOD_APP_DATABASE_URL")?;
        let host = parse_env_or("FOOD_APP_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("FOOD_APP_PORT", 8080_u16)?;

        let jwt = JwtConfig::from_env()?;
        let cloudinary = CloudinaryConfig::from_env()?;
        let cors = CorsOrigins::parse(&get_env_or_default("CORS_ALLOWED_ORIGINS", "*"));

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            cloudinary,
            cors,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            json_logs: get_env_or_default("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        })
    }

    /// Load only the database URL, for tools that never serve HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither variable is set.
    pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
        let _ = dotenvy::dotenv();
        get_database_url("FOOD_APP_DATABASE_URL")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("JWT_SECRET")?;
        validate_jwt_secret_length(&secret, "JWT_SECRET")?;

        let ttl_minutes = parse_env_or("JWT_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_TTL_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            secret,
            issuer: get_required_env("JWT_ISSUER")?,
            audience: get_required_env("JWT_AUDIENCE")?,
            ttl_minutes,
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// First of `primary_key` and `DATABASE_URL` that is set.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    [primary_key, "DATABASE_URL"]
        .into_iter()
        .find_map(get_optional_env)
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` only when it is unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// HS256 keys shorter than the digest size weaken the MAC.
fn validate_jwt_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let len = secret.expose_secret().len();
    if len >= MIN_JWT_SECRET_LENGTH {
        return Ok(());
    }
    Err(ConfigError::InsecureSecret(
        var_name.to_string(),
        format!("must be at least {MIN_JWT_SECRET_LENGTH} characters (got {len})"),
    ))
}

/// Shannon entropy of `s`, in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .into_values()
        .map(|n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy values.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(var_name.to_string(), reason);

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!("looks like a placeholder ('{pattern}')")));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "{entropy:.2} bits/char is below {MIN_ENTROPY_BITS_PER_CHAR:.1}; generate it randomly"
        )));
    }

    Ok(())
}

fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/food_app"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            jwt: JwtConfig {
                secret: SecretString::from("k9$Lw2@pQ7!zR4#tV8&xB1*nM5^cF3%h"),
                issuer: "food-app".to_string(),
                audience: "food-app-clients".to_string(),
                ttl_minutes: 60,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: "demo-cloud".to_string(),
                api_key: "123456789012345".to_string(),
                api_secret: SecretString::from("cloudinary_api_secret_value"),
            },
            cors: CorsOrigins::Any,
            sentry_dsn: None,
            sentry_environment: None,
            json_logs: false,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_uniform() {
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("changeme-jwt-key", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("k9$Lw2@pQ7!zR4#tV8&xB1*nM5^cF3%h", "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_jwt_secret_length() {
        let short = SecretString::from("k9$Lw2@pQ7!z");
        assert!(validate_jwt_secret_length(&short, "JWT_SECRET").is_err());

        let long = SecretString::from("k9$Lw2@pQ7!zR4#tV8&xB1*nM5^cF3%h");
        assert!(validate_jwt_secret_length(&long, "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_cors_origins_parse() {
        assert_eq!(CorsOrigins::parse("*"), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse(""), CorsOrigins::Any);
        assert_eq!(
            CorsOrigins::parse("https://a.example, https://b.example"),
            CorsOrigins::List(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert_eq!(CorsOrigins::parse("https://a.example,*"), CorsOrigins::Any);
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());

        assert!(debug_output.contains("demo-cloud"));
        assert!(debug_output.contains("food-app-clients"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k9$Lw2@pQ7"));
        assert!(!debug_output.contains("cloudinary_api_secret_value"));
    }
}
