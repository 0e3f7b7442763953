//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MENUCOCHON_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MENUCOCHON_BASE_URL` - Public URL of the site (e.g., <https://www.menucochon.com>)
//! - `MENUCOCHON_SESSION_SECRET` - Admin session secret (min 32 chars, high entropy)
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook endpoint signing secret
//!
//! ## Optional
//! - `MENUCOCHON_HOST` - Bind address (default: 127.0.0.1)
//! - `MENUCOCHON_PORT` - Listen port (default: 3000)
//! - `MENUCOCHON_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `STRIPE_CURRENCY` - Shop currency (default: cad)
//! - `STORAGE_PUBLIC_URL` - Public base URL of the image bucket (added to the CSP)
//! - `GA4_MEASUREMENT_ID` - Google Analytics 4 measurement ID
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)
//!
//! ## Scripts only
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`
//! - `LOCAL_LLM_URL`, `LOCAL_LLM_MODEL`
//! - `STORAGE_URL`, `STORAGE_SERVICE_KEY`, `STORAGE_BUCKET`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use menucochon_core::Currency;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_LOCAL_LLM_URL: &str = "http://127.0.0.1:11434/v1";
const DEFAULT_LOCAL_LLM_MODEL: &str = "llama3.1";
const DEFAULT_STORAGE_BUCKET: &str = "recipe-images";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Admin session signing secret
    pub session_secret: SecretString,
    /// Stripe configuration
    pub stripe: StripeConfig,
    /// Public base URL of the image bucket
    pub storage_public_url: Option<String>,
    /// Analytics tracking configuration
    pub analytics: AnalyticsConfig,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` / `sk_test_...`)
    pub secret_key: SecretString,
    /// Webhook endpoint signing secret (`whsec_...`)
    pub webhook_secret: SecretString,
    /// Currency every product is sold in
    pub currency: Currency,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish()
    }
}

/// Analytics and tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsConfig {
    /// Google Analytics 4 measurement ID
    pub ga4_measurement_id: Option<String>,
}

/// Connection settings for an OpenAI-compatible API.
#[derive(Clone)]
pub struct LlmConfig {
    /// API base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer token; local servers usually need none
    pub api_key: Option<SecretString>,
    /// Model name sent with every chat request
    pub model: String,
    /// Model used for image generation
    pub image_model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

/// Hosted object storage settings.
#[derive(Clone)]
pub struct StorageConfig {
    /// Project URL of the storage service
    pub url: String,
    /// Service role key
    pub service_key: SecretString,
    /// Bucket holding recipe images
    pub bucket: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("bucket", &self.bucket)
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
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MENUCOCHON_DATABASE_URL")?;
        let host = parse_env("MENUCOCHON_HOST", "127.0.0.1")?;
        let port = parse_env("MENUCOCHON_PORT", "3000")?;
        let base_url = get_required_env("MENUCOCHON_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let session_secret = get_validated_secret("MENUCOCHON_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "MENUCOCHON_SESSION_SECRET")?;

        let stripe = StripeConfig::from_env()?;
        let analytics = AnalyticsConfig {
            ga4_measurement_id: get_optional_env("GA4_MEASUREMENT_ID"),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            stripe,
            storage_public_url: get_optional_env("STORAGE_PUBLIC_URL"),
            analytics,
            log_json: get_optional_env("MENUCOCHON_LOG_JSON")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Configuration with dummy secrets for tests and local tooling.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/menucochon_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "https://www.menucochon.com".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_super_secret_value"),
                webhook_secret: SecretString::from("whsec_super_secret_value"),
                currency: Currency::Cad,
            },
            storage_public_url: None,
            analytics: AnalyticsConfig::default(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency_code = get_env_or_default("STRIPE_CURRENCY", "cad");
        let currency = Currency::parse(&currency_code).map_err(|e| {
            ConfigError::InvalidEnvVar("STRIPE_CURRENCY".to_string(), e.to_string())
        })?;

        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
            currency,
        })
    }
}

impl LlmConfig {
    /// `OpenAI` settings for translation and image generation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `OPENAI_API_KEY` is missing or looks like a placeholder.
    pub fn openai_from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            base_url: get_env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            api_key: Some(get_validated_secret("OPENAI_API_KEY")?),
            model: get_env_or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            image_model: get_env_or_default("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
        })
    }

    /// Local inference server settings for text rewriting.
    #[must_use]
    pub fn local_from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            base_url: get_env_or_default("LOCAL_LLM_URL", DEFAULT_LOCAL_LLM_URL),
            api_key: get_optional_env("LOCAL_LLM_API_KEY").map(SecretString::from),
            model: get_env_or_default("LOCAL_LLM_MODEL", DEFAULT_LOCAL_LLM_MODEL),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl StorageConfig {
    /// Load object storage settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORAGE_URL` or `STORAGE_SERVICE_KEY` is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            url: get_required_env("STORAGE_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_key: get_validated_secret("STORAGE_SERVICE_KEY")?,
            bucket: get_env_or_default("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` when neither variable is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-stripe-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_stripe_shaped_key() {
        let result = validate_secret_strength("sk_test_51Hq8zRk2Lm9PqX7vB3nT0cYdE", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_socket_addr_and_urls() {
        let config = SiteConfig::for_tests();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_secure());
        assert_eq!(
            config.absolute_url("/recettes"),
            "https://www.menucochon.com/recettes"
        );
    }

    #[test]
    fn test_stripe_config_debug_redacts_secrets() {
        let config = SiteConfig::for_tests();
        let debug_output = format!("{:?}", config.stripe);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret"));
    }

    #[test]
    fn test_llm_config_debug_redacts_key() {
        let config = LlmConfig {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: Some(SecretString::from("sk-very-hidden")),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("gpt-4o-mini"));
        assert!(!debug_output.contains("very-hidden"));
    }
}
