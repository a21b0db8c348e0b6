//! Configuration handling for the admin client.
//!
//! Configuration is stored in `.scicure/config.yaml` and includes:
//! - The base URL of the publishing API and the login path under it
//! - Listing defaults (page size)
//! - Initial UI store state (theme, sidebar visibility)

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::types::{DEFAULT_API_URL, DEFAULT_LOGIN_PATH, DEFAULT_PAGE_SIZE, SCICURE_DIR};
use crate::ui_store::{SidebarState, Theme, UiState};

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "page_size",
    "login_path",
    "request_timeout_secs",
    "ui.theme",
    "ui.sidebar_visible",
    "ui.sidebar_unfoldable",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Records per page in list views
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Login endpoint, relative to `api_url`
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Overall request timeout; the transport default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Persisted initial state of the UI store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub sidebar_visible: bool,
    #[serde(default)]
    pub sidebar_unfoldable: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sidebar_visible: true,
            sidebar_unfoldable: false,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            login_path: default_login_path(),
            request_timeout_secs: None,
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(SCICURE_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AdminError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.api_url)?;
        Ok(())
    }

    /// Effective API base URL: `SCICURE_API_URL` wins over the config file
    pub fn effective_api_url(&self) -> String {
        if let Ok(url) = env::var("SCICURE_API_URL")
            && !url.is_empty()
        {
            return url;
        }
        self.api_url.clone()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Initial UI store state derived from the persisted UI settings
    pub fn ui_state(&self) -> UiState {
        UiState {
            sidebar: SidebarState {
                visible: self.ui.sidebar_visible,
                unfoldable: self.ui.sidebar_unfoldable,
            },
            theme: self.ui.theme,
        }
    }

    pub fn apply_ui_state(&mut self, state: &UiState) {
        self.ui.theme = state.theme;
        self.ui.sidebar_visible = state.sidebar.visible;
        self.ui.sidebar_unfoldable = state.sidebar.unfoldable;
    }

    /// Read a single key as a display string
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api_url" => self.api_url.clone(),
            "page_size" => self.page_size.to_string(),
            "login_path" => self.login_path.clone(),
            "request_timeout_secs" => self
                .request_timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(transport default)".to_string()),
            "ui.theme" => self.ui.theme.to_string(),
            "ui.sidebar_visible" => self.ui.sidebar_visible.to_string(),
            "ui.sidebar_unfoldable" => self.ui.sidebar_unfoldable.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a single key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                url::Url::parse(value)?;
                self.api_url = value.to_string();
            }
            "page_size" => {
                let size: usize = value.parse().map_err(|_| {
                    AdminError::Config(format!("invalid page_size '{value}'"))
                })?;
                if size == 0 {
                    return Err(AdminError::Config(
                        "page_size must be greater than zero".to_string(),
                    ));
                }
                self.page_size = size;
            }
            "login_path" => self.login_path = value.trim_matches('/').to_string(),
            "request_timeout_secs" => {
                self.request_timeout_secs = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        AdminError::Config(format!("invalid request_timeout_secs '{value}'"))
                    })?)
                };
            }
            "ui.theme" => self.ui.theme = value.parse()?,
            "ui.sidebar_visible" => self.ui.sidebar_visible = parse_bool(value)?,
            "ui.sidebar_unfoldable" => self.ui.sidebar_unfoldable = parse_bool(value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| AdminError::Config(format!("invalid boolean '{value}'")))
}

fn unknown_key(key: &str) -> AdminError {
    AdminError::Config(format!(
        "unknown config key '{}', expected one of: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}
