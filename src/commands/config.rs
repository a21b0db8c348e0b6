//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use serde_json::json;

use super::CommandOutput;
use crate::config::{CONFIG_KEYS, Config};
use crate::error::Result;

pub fn cmd_config_show(as_json: bool) -> Result<()> {
    let config = Config::load()?;

    let json = json!({
        "api_url": config.api_url,
        "effective_api_url": config.effective_api_url(),
        "page_size": config.page_size,
        "login_path": config.login_path,
        "request_timeout_secs": config.request_timeout_secs,
        "ui": {
            "theme": config.ui.theme.to_string(),
            "sidebar_visible": config.ui.sidebar_visible,
            "sidebar_unfoldable": config.ui.sidebar_unfoldable,
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut lines = Vec::with_capacity(CONFIG_KEYS.len() + 1);
    for key in CONFIG_KEYS {
        lines.push(format!("{key}: {}", config.get(key)?));
    }
    if config.effective_api_url() != config.api_url {
        lines.push(format!(
            "(api_url overridden by SCICURE_API_URL: {})",
            config.effective_api_url()
        ));
    }

    CommandOutput::new(json, lines.join("\n")).print(as_json)
}

pub fn cmd_config_get(key: &str, as_json: bool) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;
    CommandOutput::new(json!({ "key": key, "value": value }), value.clone()).print(as_json)
}

pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {} = {}", key, config.get(key)?);
    Ok(())
}
