use thiserror::Error;

use crate::types::GENERIC_FAILURE_MESSAGE;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("unknown entity '{0}', expected one of: journals, articles, editors, manuscripts, indexing, contacts")]
    UnknownEntity(String),

    #[error("record '{0}' not found")]
    RecordNotFound(String),

    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl AdminError {
    /// Message suitable for showing to the end user in a notice.
    ///
    /// Server-rejected requests surface the server's text verbatim; transport
    /// and parse failures collapse to the generic message.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Api { message, .. } => message.clone(),
            AdminError::Validation { .. }
            | AdminError::RecordNotFound(_)
            | AdminError::Auth(_)
            | AdminError::Config(_)
            | AdminError::Other(_) => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
