//! Configuration types for PostPilot.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! database location, HTTP listener, and generation provider settings.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.postpilot/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite URL. When unset the database lives in the data directory.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// HTTP listener settings for `postpilot serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the Gemini text-generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider base URL (without the `/v1beta/...` path).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name used in the `generateContent` path.
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on a single generation request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Persona prompt prepended to every user prompt. `None` selects the
    /// built-in PostPilot persona.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.model, "gemini-2.0-flash");
        assert_eq!(config.generation.timeout_secs, 60);
        assert!(config.generation.system_prompt.is_none());
    }

    #[test]
    fn test_app_config_deserialize_partial_sections() {
        let toml_str = r#"
database_url = "sqlite:///tmp/pp.db"

[server]
port = 8080

[generation]
model = "gemini-1.5-pro"
system_prompt = "Be brief."
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite:///tmp/pp.db"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.model, "gemini-1.5-pro");
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.generation.system_prompt.as_deref(), Some("Be brief."));
    }
}
