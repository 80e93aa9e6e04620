use super::consts;
use secrecy::SecretString;

pub struct Config {
    base_url: String,
    public_key: SecretString,
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_public_key(mut self, public_key: SecretString) -> Self {
        self.config.public_key = public_key;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    // Defaults, with the key taken from the environment when present.
    pub fn new() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            public_key: std::env::var(consts::VAPI_PUBLIC_KEY)
                .unwrap_or_default()
                .into(),
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn public_key(&self) -> &SecretString {
        &self.public_key
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
