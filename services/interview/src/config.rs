//! Application Configuration Module
//!
//! Loads the interview client's settings from environment variables into a
//! single struct that is passed to the session at startup.

use secrecy::SecretString;
use std::env;
use tracing::Level;

pub const DEFAULT_VAPI_BASE_URL: &str = "wss://api.vapi.ai";
pub const DEFAULT_FEEDBACK_API_URL: &str = "http://127.0.0.1:3000";

/// Holds all configuration loaded from the environment.
#[derive(Debug)]
pub struct Config {
    pub vapi_base_url: String,
    pub vapi_public_key: SecretString,
    pub workflow_id: Option<String>,
    pub feedback_api_url: String,
    pub id_token: Option<SecretString>,
    pub user_id: Option<String>,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `VAPI_BASE_URL`: (Optional) Voice agent endpoint. Defaults to "wss://api.vapi.ai".
    // *   `VAPI_PUBLIC_KEY`: Public key for the voice agent. Required.
    // *   `VAPI_WORKFLOW_ID`: Workflow used by profile sessions. Required for those only.
    // *   `FEEDBACK_API_URL`: (Optional) Base URL of the feedback API. Defaults to "http://127.0.0.1:3000".
    // *   `ID_TOKEN` / `USER_ID`: (Optional) Identity of the signed-in user.
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Ignored when no .env file is present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let vapi_public_key = non_empty("VAPI_PUBLIC_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar("VAPI_PUBLIC_KEY".to_string()))?;

        let log_level_str = non_empty("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            vapi_base_url: non_empty("VAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_VAPI_BASE_URL.to_string()),
            vapi_public_key,
            workflow_id: non_empty("VAPI_WORKFLOW_ID"),
            feedback_api_url: non_empty("FEEDBACK_API_URL")
                .unwrap_or_else(|| DEFAULT_FEEDBACK_API_URL.to_string()),
            id_token: non_empty("ID_TOKEN").map(SecretString::from),
            user_id: non_empty("USER_ID"),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("VAPI_PUBLIC_KEY", "pk")])).unwrap();
        assert_eq!(config.vapi_base_url, DEFAULT_VAPI_BASE_URL);
        assert_eq!(config.feedback_api_url, DEFAULT_FEEDBACK_API_URL);
        assert_eq!(config.vapi_public_key.expose_secret(), "pk");
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.workflow_id.is_none());
        assert!(config.id_token.is_none());
    }

    #[test]
    fn public_key_is_required() {
        let err = Config::from_lookup(lookup(&[("VAPI_PUBLIC_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = Config::from_lookup(lookup(&[("VAPI_PUBLIC_KEY", "pk"), ("RUST_LOG", "LOUD")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn identity_is_read() {
        let config = Config::from_lookup(lookup(&[
            ("VAPI_PUBLIC_KEY", "pk"),
            ("ID_TOKEN", "tok"),
            ("USER_ID", "u-7"),
            ("VAPI_WORKFLOW_ID", "wf"),
        ]))
        .unwrap();
        assert_eq!(config.id_token.unwrap().expose_secret(), "tok");
        assert_eq!(config.user_id.as_deref(), Some("u-7"));
        assert_eq!(config.workflow_id.as_deref(), Some("wf"));
    }
}
