use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default message store endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8800";

/// Env var overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MSGBOARD_CONFIG";

/// Configuration for the message board client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL; `/api/messages` and `/uploads` hang off it
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
    /// Unset means requests wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub username: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            insecure: false,
            request_timeout_secs: None,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl BoardConfig {
    /// Load config from ~/.msgboard/config.toml
    ///
    /// Fails hard with actionable error if config doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            anyhow::bail!(
                "Config not found at {:?}\n\nRun: msgboard config init",
                config_path
            );
        }

        Self::load_from(&config_path)
    }

    /// Load config if present, otherwise defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and expand a config file at an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
    }

    /// Parse TOML content and expand ${VAR} references
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).context("Failed to parse config file (invalid TOML)")?;

        config.expand_variables();

        Ok(config)
    }

    /// Get config file path: $MSGBOARD_CONFIG or ~/.msgboard/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".msgboard/config.toml")
    }

    /// Directory holding the config file (also used for the TUI log)
    pub fn config_dir() -> PathBuf {
        Self::config_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Expand ${var} references from the environment
    fn expand_variables(&mut self) {
        let vars: HashMap<String, String> = env::vars().collect();

        self.store.endpoint = Self::expand_string(&self.store.endpoint, &vars);
        if let Some(ref username) = self.session.username {
            self.session.username = Some(Self::expand_string(username, &vars));
        }
    }

    /// Expand ${var} references in a string; unknown vars expand to empty
    fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    if let Some(value) = vars.get(key) {
                        result.push_str(value);
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);

        result
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Save config to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, self.to_toml()?)
            .context(format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }
}
