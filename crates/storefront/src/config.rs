//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (Supabase backend)
//! - `SUPABASE_URL` - Project URL (e.g., `https://abcd.supabase.co`)
//! - `SUPABASE_KEY` - Project API key (anon or service key, high entropy)
//!
//! ## Optional
//! - `GYM_BACKEND` - `supabase` or `memory` (default: supabase)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PROFILE_BUCKET` - Storage bucket for profile images (default: profiles)
//! - `GYM_UTC_OFFSET_HOURS` - Gym local time offset (default: 2)
//! - `GYM_CONTACT_URL` - Chat link for product inquiries (default: `https://wa.me/+201020952678`)
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Which backend to talk to
    pub backend: BackendConfig,
    /// Storage bucket holding profile images
    pub profile_bucket: String,
    /// Offset of gym local time from UTC, in hours
    pub utc_offset_hours: i32,
    /// Chat link that product inquiries are sent to
    pub contact_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend selection.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// A hosted Supabase project.
    Supabase(SupabaseConfig),
    /// In-process demo data; nothing persists across restarts.
    Memory,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL
    pub url: Url,
    /// Project API key
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
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
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(env);

        Ok(Self {
            host: env.parse_or("STOREFRONT_HOST", "127.0.0.1")?,
            port: env.parse_or("STOREFRONT_PORT", "3000")?,
            backend: BackendConfig::from_lookup(&env)?,
            profile_bucket: env.or_default("PROFILE_BUCKET", "profiles"),
            utc_offset_hours: env.parse_or("GYM_UTC_OFFSET_HOURS", "2")?,
            contact_url: env.parse_or("GYM_CONTACT_URL", "https://wa.me/+201020952678")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for running entirely in memory (tests, demos), with
    /// every other variable at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a built-in default fails to parse.
    pub fn in_memory() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| (key == "GYM_BACKEND").then(|| "memory".to_string()))
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_lookup(env: &Env<'_>) -> Result<Self, ConfigError> {
        match env.or_default("GYM_BACKEND", "supabase").as_str() {
            "memory" => Ok(Self::Memory),
            "supabase" => Ok(Self::Supabase(SupabaseConfig {
                url: env.parse_required("SUPABASE_URL")?,
                api_key: env.validated_secret("SUPABASE_KEY")?,
                timeout: Duration::from_secs(env.parse_or("BACKEND_TIMEOUT_SECS", "10")?),
            })),
            other => Err(ConfigError::InvalidEnvVar(
                "GYM_BACKEND".to_string(),
                format!("expected 'supabase' or 'memory', got '{other}'"),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment variable lookup.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional environment variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.or_default(key, default))
    }

    fn parse_required<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.required(key)?)
    }

    /// Load and validate a secret from environment.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
    let len = s.len() as f64;
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

    // Real API keys (JWTs, sb_ keys) have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key from the project settings."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const GOOD_KEY: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.aB3xY9mK2nL5pQ7rT0uW4zC6";

    fn lookup(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(&move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-supabase-key", "SUPABASE_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "SUPABASE_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(GOOD_KEY, "SUPABASE_KEY").is_ok());
    }

    #[test]
    fn test_supabase_defaults() {
        let config = lookup(&[
            ("SUPABASE_URL", "https://abcd.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
        ])
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.profile_bucket, "profiles");
        assert_eq!(config.utc_offset_hours, 2);
        assert_eq!(config.contact_url.host_str(), Some("wa.me"));
        let BackendConfig::Supabase(supabase) = config.backend else {
            panic!("expected supabase backend");
        };
        assert_eq!(supabase.timeout, Duration::from_secs(10));
        assert_eq!(supabase.api_key.expose_secret(), GOOD_KEY);
    }

    #[test]
    fn test_supabase_requires_url_and_key() {
        let err = lookup(&[("SUPABASE_KEY", GOOD_KEY)]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SUPABASE_URL"));

        let err = lookup(&[("SUPABASE_URL", "https://abcd.supabase.co")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SUPABASE_KEY"));
    }

    #[test]
    fn test_memory_backend_needs_no_credentials() {
        let config = lookup(&[("GYM_BACKEND", "memory"), ("STOREFRONT_PORT", "8080")]).unwrap();
        assert!(matches!(config.backend, BackendConfig::Memory));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = lookup(&[("GYM_BACKEND", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref v, _) if v == "GYM_BACKEND"));

        let err = lookup(&[("GYM_BACKEND", "memory"), ("STOREFRONT_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref v, _) if v == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_in_memory_config() {
        let config = StorefrontConfig::in_memory().unwrap();
        assert!(matches!(config.backend, BackendConfig::Memory));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_supabase_config_debug_redacts_key() {
        let config = SupabaseConfig {
            url: Url::parse("https://abcd.supabase.co").unwrap(),
            api_key: SecretString::from("super_private_project_key"),
            timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abcd.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_project_key"));
    }
}
