use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Backends able to score a transcript.
#[derive(Clone, Debug, PartialEq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o",
            Provider::Gemini => "gemini-2.0-flash-001",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<SecretString>,
    pub gemini_api_key: Option<SecretString>,
    pub chat_model: String,
    pub id_token_secret: Option<SecretString>,
    pub prompts_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// This function will look for a `.env` file in the current directory
    /// and load the following variables:
    ///
    /// *   `BIND_ADDRESS`: The address and port to bind the server to. Defaults to "0.0.0.0:3000".
    /// *   `SCORING_PROVIDER`: "openai" or "gemini". Defaults to "gemini".
    /// *   `OPENAI_API_KEY` / `GEMINI_API_KEY`: Required for the selected provider.
    /// *   `CHAT_MODEL`: (Optional) The scoring model. Defaults per provider.
    /// *   `ID_TOKEN_SECRET`: (Optional) Key identity tokens are signed with.
    ///     Without it no token verifies and submissions use the legacy user id.
    /// *   `PROMPTS_DIR`: (Optional) Directory of `.md` prompts. Defaults to "prompts".
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = var("SCORING_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SCORING_PROVIDER".to_string(),
                    format!("'{other}' is not one of 'openai', 'gemini'"),
                ));
            }
        };

        let openai_api_key = var("OPENAI_API_KEY").map(SecretString::from);
        let gemini_api_key = var("GEMINI_API_KEY").map(SecretString::from);
        let chat_model = var("CHAT_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // The selected provider needs its key.
        match provider {
            Provider::OpenAI if openai_api_key.is_none() => {
                return Err(ConfigError::MissingVar(
                    "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                ));
            }
            Provider::Gemini if gemini_api_key.is_none() => {
                return Err(ConfigError::MissingVar(
                    "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            gemini_api_key,
            chat_model,
            id_token_secret: var("ID_TOKEN_SECRET").map(SecretString::from),
            prompts_dir: PathBuf::from(var("PROMPTS_DIR").unwrap_or_else(|| "prompts".to_string())),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(vars: &'static [(&'static str, &'static str)]) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn gemini_is_the_default_provider() {
        let config = from(&[("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.chat_model, "gemini-2.0-flash-001");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.prompts_dir, PathBuf::from("prompts"));
        assert!(config.id_token_secret.is_none());
    }

    #[test]
    fn provider_key_is_required() {
        assert!(matches!(
            from(&[("SCORING_PROVIDER", "openai"), ("GEMINI_API_KEY", "g")]),
            Err(ConfigError::MissingVar(_))
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(matches!(
            from(&[("SCORING_PROVIDER", "llama"), ("GEMINI_API_KEY", "g")]),
            Err(ConfigError::InvalidValue(_, _))
        ));
    }

    #[test]
    fn explicit_values_win() {
        let config = from(&[
            ("SCORING_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "o"),
            ("CHAT_MODEL", "gpt-4.1"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("ID_TOKEN_SECRET", "shh"),
        ])
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.chat_model, "gpt-4.1");
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert!(config.id_token_secret.is_some());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        assert!(from(&[("BIND_ADDRESS", "nowhere"), ("GEMINI_API_KEY", "g")]).is_err());
    }
}
