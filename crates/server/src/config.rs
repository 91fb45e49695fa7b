//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOCK_HOME_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOCK_HOME_BASE_URL` - Public URL of the app; `https` enables secure cookies
//! - `STOCK_HOME_SESSION_SECRET` - Cookie signing secret (min 64 chars, high entropy)
//!
//! ## Optional
//! - `STOCK_HOME_HOST` - Bind address (default: 127.0.0.1)
//! - `STOCK_HOME_PORT` - Listen port (default: 3000)
//! - `STOCK_HOME_REQUIRE_EMAIL_CONFIRMATION` - Refuse sign-in for unconfirmed emails (default: false)
//! - `STOCK_HOME_LOG_JSON` - Emit JSON logs instead of text (default: false)
//! - `STOCK_HOME_TRUST_PROXY` - Rate-limit by `X-Forwarded-For`/`X-Real-IP` instead of the
//!   TCP peer; only set behind a proxy that overwrites those headers (default: false)
//! - `STOCK_HOME_UTC_OFFSET` - Household UTC offset for "today" in the timeline (default: +07:00)
//! - `SENTRY_DSN` - Sentry DSN for error tracking
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::FixedOffset;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Cookie signing keys must be at least 64 bytes.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Western Indonesian Time.
const DEFAULT_UTC_OFFSET: &str = "+07:00";

/// Fragments that show up in copy-pasted `.env` templates.
const TEMPLATE_FRAGMENTS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "put-your",
    "insert",
    "xxx",
    "todo",
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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL
    pub base_url: Url,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Whether sign-in requires a confirmed email address
    pub require_email_confirmation: bool,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Take the client address from proxy headers when rate limiting
    pub trust_proxy: bool,
    /// Where the household's calendar day starts
    pub utc_offset: FixedOffset,
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from the process environment, reading `.env`
    /// first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing required variable, a value that
    /// does not parse, or a session secret that looks like a template value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = optional("STOCK_HOME_DATABASE_URL")
            .or_else(|| optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOCK_HOME_DATABASE_URL".to_string()))?;

        let session_secret = SecretString::from(required("STOCK_HOME_SESSION_SECRET")?);
        check_session_secret(&session_secret, "STOCK_HOME_SESSION_SECRET")?;

        Ok(Self {
            database_url,
            host: parsed_or("STOCK_HOME_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parsed_or("STOCK_HOME_PORT", 3000)?,
            base_url: parse_value("STOCK_HOME_BASE_URL", &required("STOCK_HOME_BASE_URL")?)?,
            session_secret,
            require_email_confirmation: flag("STOCK_HOME_REQUIRE_EMAIL_CONFIRMATION")?,
            log_json: flag("STOCK_HOME_LOG_JSON")?,
            trust_proxy: flag("STOCK_HOME_TRUST_PROXY")?,
            utc_offset: parse_value(
                "STOCK_HOME_UTC_OFFSET",
                &optional("STOCK_HOME_UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_owned()),
            )?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the app is served over HTTPS (cookies get the `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

/// A set, non-empty environment variable.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

/// An on/off switch that defaults to off.
fn flag(key: &str) -> Result<bool, ConfigError> {
    let Some(raw) = optional(key) else {
        return Ok(false);
    };
    parse_bool(&raw).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("expected a boolean, got '{raw}'"))
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A sampling fraction in `[0.0, 1.0]`.
fn rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let value: f32 = parsed_or(key, default)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {value})"),
        ))
    }
}

/// Bits of information per character, by symbol frequency.
fn entropy_per_char(s: &str) -> f64 {
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
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject short keys, template values and low-entropy strings.
fn check_session_secret(secret: &SecretString, key: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_string(), reason));

    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
            value.len()
        ));
    }

    let lower = value.to_ascii_lowercase();
    if let Some(fragment) = TEMPLATE_FRAGMENTS.iter().find(|f| lower.contains(**f)) {
        return insecure(format!("looks like a template value (contains '{fragment}')"));
    }

    let bits = entropy_per_char(value);
    if bits < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "too predictable ({bits:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it with `openssl rand -base64 64`"
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A configuration suitable for router tests. Never connects anywhere.
    pub(crate) fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/stock_home_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("http://localhost:3000").unwrap(),
            session_secret: SecretString::from(
                "q8Zr2LmX4vN7tB1yK9wE3hJ6uA0sD5fGcV8bP2oI7nM4lQ1zR6xT3yU9eW0aS5dF",
            ),
            require_email_confirmation: false,
            log_json: false,
            trust_proxy: false,
            utc_offset: DEFAULT_UTC_OFFSET.parse().unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn rejected(secret: &str) -> bool {
        matches!(
            check_session_secret(&SecretString::from(secret.to_string()), "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        )
    }

    #[test]
    fn test_entropy() {
        assert!(entropy_per_char("").abs() < f64::EPSILON);
        assert!(entropy_per_char("zzzz").abs() < f64::EPSILON);
        assert!((entropy_per_char("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_test_config_secret_is_accepted() {
        let config = test_config();
        assert!(check_session_secret(&config.session_secret, "TEST").is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = test_config();
        let secret = config.session_secret.expose_secret();
        assert!(rejected(&secret[..MIN_SESSION_SECRET_LENGTH - 1]));
    }

    #[test]
    fn test_template_secret_is_rejected() {
        let secret = format!("changeme-{}", "q8Zr2LmX4vN7tB1yK9wE3hJ6uA0sD5fGcV8bP2oI7nM4lQ1zR6xT3yU9");
        assert!(rejected(&secret));
    }

    #[test]
    fn test_repetitive_secret_is_rejected() {
        assert!(rejected(&"ab".repeat(40)));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_value_reports_the_variable() {
        let err = parse_value::<u16>("STOCK_HOME_PORT", "eighty").unwrap_err();
        assert!(err.to_string().starts_with("Invalid environment variable STOCK_HOME_PORT"));
    }

    #[test]
    fn test_utc_offset_parses() {
        let wib: FixedOffset = parse_value("STOCK_HOME_UTC_OFFSET", DEFAULT_UTC_OFFSET).unwrap();
        assert_eq!(wib.local_minus_utc(), 7 * 3600);
        assert!(parse_value::<FixedOffset>("STOCK_HOME_UTC_OFFSET", "WIB").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_scheme() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = Url::parse("https://stock.example.org").unwrap();
        assert!(config.is_secure());
    }
}
