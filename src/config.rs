//! Configuration loading and the credential gate.
//!
//! Tunables come from `~/.iris/config.toml` (optional) with environment
//! overrides on top. The four service secrets are read from the environment
//! only and never from the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the Wolfram|Alpha AppID.
pub const WOLFRAM_APP_ID: &str = "WOLFRAM_APP_ID";
/// Environment variable holding the Notion integration token.
pub const NOTION_TOKEN: &str = "NOTION_TOKEN";
/// Environment variable holding the target Notion database id.
pub const NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct IrisConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub wolfram: WolframConfig,
    pub notion: NotionConfig,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
    /// Problems found while loading. Config loads before logging is set up,
    /// so these are held until [`IrisConfig::report`].
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Sessions untouched for this long are discarded.
    pub session_idle_secs: u64,
    /// Upper bound on live sessions; the least recently used is evicted beyond it.
    pub max_sessions: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WolframConfig {
    pub base_url: String,
    /// `metric` or `nonmetric`; left to the service default when unset.
    pub units: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    pub api_version: String,
    pub title_property: String,
    pub type_property: String,
    pub response_property: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 7860,
            log_level: "info".into(),
            session_idle_secs: 3600,
            max_sessions: 1000,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            system_prompt: None,
            timeout_secs: 120,
        }
    }
}

impl Default for WolframConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.wolframalpha.com/v2".into(),
            units: None,
            timeout_secs: 120,
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".into(),
            api_version: "2022-06-28".into(),
            title_property: "Título".into(),
            type_property: "Tipo".into(),
            response_property: "Resposta".into(),
            timeout_secs: 60,
        }
    }
}

/// Returns `~/.iris/`
pub fn default_iris_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".iris")
}

/// Returns the default config file path: `~/.iris/config.toml`
pub fn default_config_path() -> PathBuf {
    default_iris_dir().join("config.toml")
}

impl IrisConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            let mut config: IrisConfig =
                toml::from_str(&contents).context("failed to parse config TOML")?;
            config.source = Some(path.to_path_buf());
            config
        } else {
            IrisConfig::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides (IRIS_HOST, IRIS_PORT, IRIS_LOG_LEVEL) from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("IRIS_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("IRIS_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => self
                    .warnings
                    .push(format!("ignoring invalid IRIS_PORT {val:?}")),
            }
        }
        if let Some(val) = lookup("IRIS_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Log where the settings came from and any load warnings. Call once the
    /// tracing subscriber is installed.
    pub fn report(&self) {
        match &self.source {
            Some(path) => info!(path = %path.display(), "configuration loaded"),
            None => info!(
                path = %default_config_path().display(),
                "no config file, using defaults"
            ),
        }
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }
}

/// Failures of the credential gate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required secrets: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),
}

/// The four service secrets, read once from the process environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub wolfram_app_id: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
}

// Keep key material out of logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        f.debug_struct("Secrets")
            .field("openai_api_key", &status.openai)
            .field("wolfram_app_id", &status.wolfram)
            .field("notion_token", &status.notion)
            .field("notion_database_id", &status.database)
            .finish()
    }
}

/// Whether a configured secret can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Present,
    Missing,
    /// Set, but a secret it depends on is not.
    Unused,
}

impl Availability {
    fn of(value: &Option<String>) -> Self {
        if value.is_some() {
            Self::Present
        } else {
            Self::Missing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Missing => "missing",
            Self::Unused => "unused",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-secret availability, as shown in the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecretsStatus {
    pub openai: Availability,
    pub wolfram: Availability,
    pub notion: Availability,
    pub database: Availability,
}

impl Secrets {
    /// Read all four secrets from the environment. Empty values count as absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary name → value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: read(OPENAI_API_KEY),
            wolfram_app_id: read(WOLFRAM_APP_ID),
            notion_token: read(NOTION_TOKEN),
            notion_database_id: read(NOTION_DATABASE_ID),
        }
    }

    /// Fail with every missing required secret. The database id is optional.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (OPENAI_API_KEY, &self.openai_api_key),
            (WOLFRAM_APP_ID, &self.wolfram_app_id),
            (NOTION_TOKEN, &self.notion_token),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingSecrets(missing))
        }
    }

    pub fn status(&self) -> SecretsStatus {
        let database = match (&self.notion_database_id, &self.notion_token) {
            (Some(_), None) => Availability::Unused,
            (id, _) => Availability::of(id),
        };
        SecretsStatus {
            openai: Availability::of(&self.openai_api_key),
            wolfram: Availability::of(&self.wolfram_app_id),
            notion: Availability::of(&self.notion_token),
            database,
        }
    }
}
