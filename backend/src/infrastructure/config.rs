use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::ApiKey;

/// Process-wide gateway configuration, read once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub heygen: ProviderConfig,
    pub llm: LlmConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// Streaming-avatar provider credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: ApiKey,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: ApiKey,
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Well-known environment names mapped onto config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("heygen.api_key", "HEYGEN_API_KEY"),
    ("heygen.base_url", "HEYGEN_BASE_URL"),
    ("llm.api_key", "OPENAI_API_KEY"),
    ("llm.url", "OPENAI_URL"),
];

impl GatewayConfig {
    /// Defaults, then `avatar-gateway.toml`, then `AVATAR__*` and the well-known variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Self::defaults()?
            .add_source(File::with_name("avatar-gateway").required(false))
            .add_source(Environment::with_prefix("AVATAR").separator("__"));

        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        Self::from_builder(builder)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.bind_addr", "0.0.0.0:8080")?
            .set_default("heygen.base_url", "https://api.heygen.com/v1")?
            .set_default("llm.url", "https://api.openai.com/v1/chat/completions")?
            .set_default("llm.model", "gpt-3.5-turbo")?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.system_prompt", "You are a friendly AI avatar.")?
            .set_default("http.timeout_secs", 30)?)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let mut config: Self = builder
            .build()
            .context("Failed to read gateway configuration")?
            .try_deserialize()
            .context("Invalid gateway configuration (HEYGEN_API_KEY and OPENAI_API_KEY are required)")?;

        config.heygen.base_url = config.heygen.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
