/**
 * Server Configuration
 *
 * All environment-driven configuration is collected once at process start
 * into an `AppConfig` and passed explicitly into the gateway, billing
 * client, and handlers. Request-handling code never reads ambient
 * environment state.
 *
 * # Error Handling
 *
 * A missing required variable is a startup error: the process reports the
 * variable name and exits rather than silently degrading.
 */

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default request timeout for all outbound provider calls, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default port for the HTTP server
const DEFAULT_PORT: u16 = 8000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed
    #[error("invalid value for {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}

/// Application configuration loaded at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// AI provider API key
    pub openai_api_key: String,
    /// AI provider base URL (overridable for testing)
    pub openai_api_base: String,
    /// Billing provider secret key
    pub stripe_secret_key: String,
    /// Billing webhook signing secret
    pub stripe_webhook_secret: String,
    /// Price identifier for the basic plan
    pub stripe_price_basic: String,
    /// Price identifier for the premium plan
    pub stripe_price_premium: String,
    /// Billing provider base URL (overridable for testing)
    pub stripe_api_base: String,
    /// Frontend base URL for checkout redirects
    pub frontend_url: String,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// Directory where generated artifacts are written
    pub artifact_dir: PathBuf,
    /// Timeout applied to every outbound provider call
    pub request_timeout: Duration,
    /// Port the HTTP server binds to
    pub server_port: u16,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Construction is pure over the lookup function so tests can supply
    /// a map instead of mutating process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = require(&get, "DATABASE_URL")?;
        let openai_api_key = require(&get, "OPENAI_API_KEY")?;
        let stripe_secret_key = require(&get, "STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = require(&get, "STRIPE_WEBHOOK_SECRET")?;
        let stripe_price_basic = require(&get, "STRIPE_PRICE_BASIC")?;
        let stripe_price_premium = require(&get, "STRIPE_PRICE_PREMIUM")?;
        let frontend_url = require(&get, "FRONTEND_URL")?;
        let jwt_secret = require(&get, "JWT_SECRET")?;

        let openai_api_base = get("OPENAI_API_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let stripe_api_base = get("STRIPE_API_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "https://api.stripe.com".to_string());

        let artifact_dir = get("ARTIFACT_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("promptforge"));

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "REQUEST_TIMEOUT_SECS",
                    message: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let server_port = match get("SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "SERVER_PORT",
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            openai_api_key,
            openai_api_base,
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_price_basic,
            stripe_price_premium,
            stripe_api_base,
            frontend_url,
            jwt_secret,
            artifact_dir,
            request_timeout,
            server_port,
        })
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    get(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/promptforge"),
            ("OPENAI_API_KEY", "sk-test"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_123"),
            ("STRIPE_PRICE_BASIC", "price_basic"),
            ("STRIPE_PRICE_PREMIUM", "price_premium"),
            ("FRONTEND_URL", "http://localhost:8501"),
            ("JWT_SECRET", "secret"),
        ])
    }

    #[test]
    fn test_full_config_loads() {
        let vars = full_vars();
        let config = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.openai_api_base, "https://api.openai.com/v1");
        assert_eq!(config.stripe_api_base, "https://api.stripe.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.server_port, 8000);
    }

    #[test]
    fn test_missing_variable_fails_fast() {
        let mut vars = full_vars();
        vars.remove("STRIPE_WEBHOOK_SECRET");
        let err = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .expect_err("config should fail without webhook secret");
        match err {
            ConfigError::Missing(name) => assert_eq!(name, "STRIPE_WEBHOOK_SECRET"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_variable_treated_as_missing() {
        let mut vars = full_vars();
        vars.insert("OPENAI_API_KEY", "");
        let result = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert!(matches!(result, Err(ConfigError::Missing("OPENAI_API_KEY"))));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let mut vars = full_vars();
        vars.insert("REQUEST_TIMEOUT_SECS", "soon");
        let result = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_overrides_honored() {
        let mut vars = full_vars();
        vars.insert("OPENAI_API_BASE", "http://127.0.0.1:9999/v1");
        vars.insert("REQUEST_TIMEOUT_SECS", "5");
        vars.insert("SERVER_PORT", "9000");
        let config = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.openai_api_base, "http://127.0.0.1:9999/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.server_port, 9000);
    }
}
