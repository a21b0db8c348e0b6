//! Persisted session state.
//!
//! The session lives in `.scicure/session.json` as a flat map of string
//! values, mirroring browser local storage:
//!
//! - `authToken`: opaque bearer token
//! - `userRole`: `"admin"`, `"journal"`, or absent
//! - `userInfo`: JSON-encoded object with at least `id`/`_id`, `email`, `role`
//! - `loginAt`: RFC 3339 timestamp of the last login
//!
//! Nothing read from this file is trusted to be well formed. A corrupt file
//! loads as an empty store and a corrupt `userInfo` yields the default identity.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::types::{JOURNAL_ROLE, SCICURE_DIR};

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_ROLE_KEY: &str = "userRole";
pub const USER_INFO_KEY: &str = "userInfo";
pub const LOGIN_AT_KEY: &str = "loginAt";

/// Who the current session belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub role: Option<String>,
    /// The journal's own record id when `role` is `"journal"`
    pub subject_id: Option<String>,
    pub email: Option<String>,
    pub journal_image: Option<String>,
}

impl SessionIdentity {
    pub fn is_journal(&self) -> bool {
        self.role.as_deref() == Some(JOURNAL_ROLE)
    }

    /// Subject id to scope by, present only for journal sessions with a non-empty id
    pub fn scope_id(&self) -> Option<&str> {
        if !self.is_journal() {
            return None;
        }
        self.subject_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Key-value session storage backed by a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    pub fn session_path() -> PathBuf {
        PathBuf::from(SCICURE_DIR).join("session.json")
    }

    /// Load the store; a missing or unreadable file yields an empty store
    pub fn load() -> Self {
        let path = Self::session_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        Self::from_json(&content)
    }

    /// Parse stored content, discarding non-string values
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<BTreeMap<String, Value>>(content) {
            Ok(map) => Self {
                entries: map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::String(s) => Some((k, s)),
                        _ => None,
                    })
                    .collect(),
            },
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::session_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bearer token, or an empty string when none is stored
    pub fn token(&self) -> &str {
        self.get(AUTH_TOKEN_KEY).unwrap_or("")
    }

    pub fn has_token(&self) -> bool {
        !self.token().is_empty()
    }

    /// Write everything a successful login produces
    pub fn record_login(&mut self, token: &str, user: &Value) {
        self.set(AUTH_TOKEN_KEY, token);
        if let Some(role) = user.get("role").and_then(Value::as_str) {
            self.set(USER_ROLE_KEY, role);
        } else {
            self.remove(USER_ROLE_KEY);
        }
        self.set(USER_INFO_KEY, user.to_string());
        self.set(LOGIN_AT_KEY, jiff::Timestamp::now().to_string());
    }
}

/// Read the session identity, falling back to the default on any malformed data
pub fn parse_session_or_default(store: &SessionStore) -> SessionIdentity {
    let info = store
        .get(USER_INFO_KEY)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .filter(Value::is_object);

    let Some(info) = info else {
        return SessionIdentity {
            role: store.get(USER_ROLE_KEY).map(str::to_string),
            ..Default::default()
        };
    };

    let role = store
        .get(USER_ROLE_KEY)
        .map(str::to_string)
        .or_else(|| info.get("role").and_then(Value::as_str).map(str::to_string));

    let subject_id = info
        .get("id")
        .or_else(|| info.get("_id"))
        .and_then(value_as_id);

    SessionIdentity {
        role,
        subject_id,
        email: info.get("email").and_then(Value::as_str).map(str::to_string),
        journal_image: info
            .get("journalImage")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
