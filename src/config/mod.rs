//! Configuration management for Study Companion
//!
//! Supports configuration via:
//! 1. Config file (~/.config/study-companion/config.toml)
//! 2. Environment variables (GEMINI_API_KEY / API_KEY, GEMINI_BASE_URL, GEMINI_MODEL)
//! 3. CLI arguments (override file/env settings)

use crate::api::{GeminiConfig, GeminiProvider};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini connection settings
    pub gemini: GeminiSettings,

    /// Tutor panel settings
    pub tutor: TutorSettings,

    /// Summarizer panel settings
    pub summarizer: PanelSettings,

    /// Planner panel settings
    pub planner: PanelSettings,
}

/// Gemini settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// API key (can also use GEMINI_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the Gemini API
    pub base_url: String,

    /// Default model to use
    pub model: String,

    /// Temperature for generation (service default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens for responses (service default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::api::DEFAULT_BASE_URL.to_string(),
            model: crate::api::DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Tutor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorSettings {
    /// Persona override (built-in tutor persona when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Model override for this panel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Settings shared by the single-shot panels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Model override for this panel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("study-companion")
            .join("config.toml")
    }

    /// Load config from specific path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|name| non_blank(name)) {
            self.gemini.api_key = Some(key);
        }
        if let Some(url) = non_blank("GEMINI_BASE_URL") {
            self.gemini.base_url = url;
        }
        if let Some(model) = non_blank("GEMINI_MODEL") {
            self.gemini.model = model;
        }

        self
    }

    /// Save config to specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Validate configuration. A missing API key is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_key()?;

        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::MissingRequired("gemini.model".to_string()));
        }

        Ok(())
    }

    /// The configured API key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.gemini
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingRequired(
                    "API key not set (export GEMINI_API_KEY or set gemini.api_key)".to_string(),
                )
            })
    }

    /// Provider settings for the default model
    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigError> {
        Ok(GeminiConfig {
            api_key: self.api_key()?.to_string(),
            model: self.gemini.model.clone(),
            base_url: Some(self.gemini.base_url.clone()),
            max_output_tokens: self.gemini.max_output_tokens,
            temperature: self.gemini.temperature,
        })
    }

    /// Build the provider, failing if no API key is configured
    pub fn provider(&self) -> Result<GeminiProvider, ConfigError> {
        self.validate()?;
        Ok(GeminiProvider::new(self.gemini_config()?))
    }

    /// Copy with API keys masked, for display
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        if config.gemini.api_key.is_some() {
            config.gemini.api_key = Some("***".to_string());
        }
        config
    }

    /// Generate example config content
    pub fn example() -> String {
        let example = Config::default();
        toml::to_string_pretty(&example).unwrap_or_default()
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.gemini.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.gemini.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.gemini.temperature = Some(temperature);
        self
    }

    pub fn tutor_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.tutor.system_instruction = Some(instruction.into());
        self
    }

    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.config.planner.model = Some(model.into());
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.tutor.system_instruction.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .api_key("test-key")
            .model("gemini-2.0-flash")
            .planner_model("gemini-2.5-pro")
            .build();

        assert_eq!(config.gemini.api_key, Some("test-key".to_string()));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.planner.model.as_deref(), Some("gemini-2.5-pro"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
        assert!(config.provider().is_err());

        let blank = ConfigBuilder::new().api_key("   ").build();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_overrides_prefer_gemini_key() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "secondary"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.gemini.api_key.as_deref(), Some("primary"));
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_overrides_fall_back_to_api_key() {
        let config = Config::default().with_overrides_from(|name| match name {
            "GEMINI_API_KEY" => Some(String::new()),
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });

        assert_eq!(config.gemini.api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_blank_overrides_keep_defaults() {
        let config = Config::default().with_overrides_from(|name| match name {
            "GEMINI_BASE_URL" => Some(String::new()),
            "GEMINI_MODEL" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.gemini.base_url, crate::api::DEFAULT_BASE_URL);
        assert_eq!(config.gemini.model, crate::api::DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [gemini]
            api_key = "from-file"

            [tutor]
            system_instruction = "Be Socratic."
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key().unwrap(), "from-file");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.tutor.system_instruction.as_deref(), Some("Be Socratic."));
    }

    #[test]
    fn test_masked_hides_key() {
        let config = ConfigBuilder::new().api_key("secret").build();
        let shown = toml::to_string_pretty(&config.masked()).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn test_example_config() {
        let example = Config::example();
        assert!(example.contains("[gemini]"));
        assert!(!example.contains("api_key"));
    }
}
