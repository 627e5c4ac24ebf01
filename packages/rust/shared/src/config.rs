//! Application configuration for Lexigen.
//!
//! User config lives at `~/.lexigen/lexigen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, VocabError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lexigen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lexigen";

// ---------------------------------------------------------------------------
// Config structs (matching lexigen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent to the completion service.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single completion call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}

// ---------------------------------------------------------------------------
// Generation settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime settings for the completion client: merged from config file + CLI flags.
///
/// Passed explicitly into the client; nothing here is process-global.
#[derive(Clone)]
pub struct GenerationSettings {
    /// Model identifier.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: Url,
    /// Resolved credential; `None` if the env var was unset or empty.
    pub api_key: Option<String>,
    /// Timeout for one completion call.
    pub timeout: Duration,
}

impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerationSettings {
    /// Resolve settings from the loaded config, reading the credential from the
    /// configured env var.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.generation.base_url).map_err(|e| {
            VocabError::config(format!(
                "invalid generation.base_url '{}': {e}",
                config.generation.base_url
            ))
        })?;

        Ok(Self {
            model: config.generation.model.clone(),
            base_url,
            api_key: resolve_api_key(config),
            timeout: Duration::from_secs(config.generation.timeout_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lexigen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| VocabError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lexigen/lexigen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VocabError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| VocabError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| VocabError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| VocabError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| VocabError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the credential from the env var named by `generation.api_key_env`.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.generation.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

/// Check that the completion service API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    match resolve_api_key(config) {
        Some(_) => Ok(()),
        None => Err(VocabError::misconfigured(format!(
            "completion service API key not found. Set the {} environment variable.",
            config.generation.api_key_env
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[generation]"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("127.0.0.1:3000"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[generation]
model = "gpt-4o-mini"
timeout_secs = 15
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.timeout_secs, 15);
        assert_eq!(config.generation.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn settings_from_config() {
        let mut config = AppConfig::default();
        config.generation.api_key_env = "LEXIGEN_TEST_NONEXISTENT_KEY_31337".into();
        let settings = GenerationSettings::from_config(&config).expect("settings");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.base_url.as_str(), "https://api.openai.com/v1");
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn settings_reject_bad_base_url() {
        let mut config = AppConfig::default();
        config.generation.base_url = "not a url".into();
        let err = GenerationSettings::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("generation.base_url"));
    }

    #[test]
    fn settings_debug_redacts_key() {
        let settings = GenerationSettings {
            model: "m".into(),
            base_url: Url::parse("http://localhost").unwrap(),
            api_key: Some("sk-secret".into()),
            timeout: Duration::from_secs(1),
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.generation.api_key_env = "LEXIGEN_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(matches!(result, Err(VocabError::Misconfigured { .. })));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("LEXIGEN_TEST_NONEXISTENT_KEY_12345")
        );
    }
}
