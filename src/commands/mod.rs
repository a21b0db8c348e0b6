pub mod config;
pub mod interactive;
mod lookup;
mod records;
mod session;
mod ui;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use lookup::{LookupKind, cmd_lookup};
pub use records::{
    ListOptions, WriteOptions, cmd_create, cmd_delete, cmd_list, cmd_mark_read, cmd_show,
    cmd_update,
};
pub use session::{cmd_login, cmd_logout, cmd_whoami};
pub use ui::cmd_ui;

use std::future::Future;

use serde_json::Value;

use crate::config::Config;
use crate::error::{AdminError, Result};
use crate::session::SessionStore;

/// Output of a command in both machine and human form
pub struct CommandOutput {
    json: Value,
    text: String,
}

impl CommandOutput {
    pub fn new(json: Value, text: impl Into<String>) -> Self {
        Self {
            json,
            text: text.into(),
        }
    }

    pub fn print(self, as_json: bool) -> Result<()> {
        if as_json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else if !self.text.is_empty() {
            println!("{}", self.text);
        }
        Ok(())
    }
}

/// Run an async command body to completion.
///
/// Each CLI invocation is a single screen mount, so one runtime per command
/// is enough.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| AdminError::Other(format!("Failed to create runtime: {}", e)))?;
    Ok(rt.block_on(future))
}

/// Route guard for every command that reads entity data
pub fn require_session(session: &SessionStore) -> Result<()> {
    if session.has_token() {
        Ok(())
    } else {
        Err(AdminError::Auth(
            "not logged in; run 'scicure login'".to_string(),
        ))
    }
}

/// Config and session, loaded together for commands that talk to the API
pub struct AppContext {
    pub config: Config,
    pub session: SessionStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: Config::load()?,
            session: SessionStore::load(),
        })
    }

    /// Load and pass the route guard
    pub fn authenticated() -> Result<Self> {
        let ctx = Self::load()?;
        require_session(&ctx.session)?;
        Ok(ctx)
    }
}

/// Split a `key=value` argument
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg.split_once('=').ok_or_else(|| {
        AdminError::Other(format!("expected key=value, got '{arg}'"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AdminError::Other(format!("empty key in '{arg}'")));
    }
    Ok((key.to_string(), value.to_string()))
}
