//! Configuration loading for PostPilot.
//!
//! Reads `config.toml` from the data directory (`~/.postpilot/` by default)
//! into [`AppConfig`], falling back to defaults when the file is missing or
//! malformed, then layers environment overrides on top.

use std::path::{Path, PathBuf};

use postpilot_types::config::AppConfig;
use secrecy::SecretString;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "POSTPILOT_DATA_DIR";
/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable carrying the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the Gemini model.
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `POSTPILOT_DATA_DIR` environment variable
/// 2. `~/.postpilot`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".postpilot");
    }

    // Last resort: current directory
    PathBuf::from(".postpilot")
}

/// Load configuration from `{data_dir}/config.toml` and apply environment
/// overrides.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load `{data_dir}/config.toml` without environment overrides.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply `DATABASE_URL` and `GEMINI_MODEL` overrides read through `lookup`.
///
/// Empty values are ignored.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup(DATABASE_URL_ENV) {
        config.database_url = Some(url);
    }
    if let Some(model) = lookup(GEMINI_MODEL_ENV) {
        config.generation.model = model;
    }
}

/// The SQLite URL to open: the configured URL, or `postpilot.db` in the
/// data directory.
pub fn database_url(config: &AppConfig, data_dir: &Path) -> String {
    match &config.database_url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", data_dir.join("postpilot.db").display()),
    }
}

/// Read the Gemini API key from `GEMINI_API_KEY`.
pub fn gemini_api_key() -> Option<SecretString> {
    std::env::var(GEMINI_API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
}
