//! Configuration system for the chat service
//!
//! Loaded from a TOML file with `[server]`, `[site]` and `[llm]` sections.
//! Secrets never live in the file: `llm.api_key_env` names the environment
//! variable that holds the provider key.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Providers understood by the service
pub const SUPPORTED_PROVIDERS: &[&str] = &["groq", "openai"];

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub site: SiteSection,
    pub llm: LlmSection,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Storefront settings used to build links and greetings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSection {
    /// Storefront origin that generated links are built on
    #[serde(default = "default_site_base_url")]
    pub base_url: String,
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: default_site_base_url(),
            welcome_message: default_welcome_message(),
        }
    }
}

/// LLM section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// Provider name ("groq" or "openai")
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Environment variable containing API key
    pub api_key_env: String,
    /// Override for the provider's API base URL
    pub base_url: Option<String>,
    /// Optional system prompt
    pub system_prompt: Option<String>,
    /// Optional temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Optional max tokens
    pub max_tokens: Option<u32>,
    /// Upper bound for one fallback call in seconds; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> u64 {
    64 * 1024
}

fn default_site_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_welcome_message() -> String {
    "Welcome to PaperSprint! Upload your documents, choose your print options and we'll deliver the prints to your door.".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChatConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: ChatConfig = toml::from_str(content)?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "server.port must be non-zero".to_string(),
            ));
        }
        self.server.host.parse::<IpAddr>().map_err(|_| {
            ConfigError::InvalidConfig(format!(
                "server.host '{}' is not an IP address",
                self.server.host
            ))
        })?;

        for origin in &self.server.allowed_origins {
            validate_origin(origin)?;
        }

        validate_http_url("site.base_url", &self.site.base_url)?;
        if let Some(base_url) = &self.llm.base_url {
            validate_http_url("llm.base_url", base_url)?;
        }

        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Unsupported LLM provider '{}', expected one of {:?}",
                self.llm.provider, SUPPORTED_PROVIDERS
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }
        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidConfig(format!(
                    "llm.temperature {temperature} is outside 0.0..=2.0"
                )));
            }
        }

        Ok(())
    }

    /// Generated links are `base_url + path`, so drop any trailing slash
    fn normalize(&mut self) {
        let trimmed = self.site.base_url.trim_end_matches('/').len();
        self.site.base_url.truncate(trimmed);
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            ConfigError::InvalidConfig(format!(
                "server.host '{}' is not an IP address",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Fallback timeout, `None` when disabled
    pub fn agent_timeout(&self) -> Option<Duration> {
        (self.llm.timeout_secs > 0).then(|| Duration::from_secs(self.llm.timeout_secs))
    }

    /// Get LLM API key from environment variable
    pub fn get_llm_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.llm.api_key_env)
            .map_err(|_| ConfigError::EnvVarNotFound(self.llm.api_key_env.clone()))
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[llm]
provider = "groq"
model = "llama3-8b-8192"
api_key_env = "GROQ_API_KEY"
temperature = 0.0
"#;
        Self::from_toml_str(toml_content).expect("Test config should parse")
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidConfig(format!("{field} '{value}' is not a URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfig(format!(
            "{field} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidConfig(format!(
            "{field} must not carry a query or fragment"
        )));
    }

    Ok(())
}

/// CORS origins are bare `scheme://host[:port]` values
fn validate_origin(value: &str) -> Result<(), ConfigError> {
    validate_http_url("server.allowed_origins", value)?;

    let url = Url::parse(value).map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
    if url.path() != "/" || value.ends_with('/') {
        return Err(ConfigError::InvalidConfig(format!(
            "CORS origin '{value}' must not include a path"
        )));
    }

    Ok(())
}
