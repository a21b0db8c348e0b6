//! Session commands: login, logout, whoami.

use serde_json::json;

use super::interactive::prompt_line;
use super::{CommandOutput, block_on};
use crate::api::ApiClient;
use crate::config::Config;
use crate::display::mask_sensitive_value;
use crate::error::Result;
use crate::session::{LOGIN_AT_KEY, SessionStore, parse_session_or_default};

/// Exchange credentials for a token and persist the session.
///
/// The password is read from stdin when not given.
pub fn cmd_login(email: &str, password: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password")?,
    };

    let client = ApiClient::new(&config.effective_api_url(), "", config.request_timeout())?;
    let response = block_on(client.login(&config.login_path, email, &password))??;

    let mut session = SessionStore::load();
    session.record_login(&response.token, &response.user);
    session.save()?;

    let identity = parse_session_or_default(&session);
    tracing::debug!("logged in as {:?}", identity.role);
    println!(
        "Logged in as {} ({})",
        identity.email.as_deref().unwrap_or(email),
        identity.role.as_deref().unwrap_or("no role")
    );
    Ok(())
}

pub fn cmd_logout() -> Result<()> {
    let mut session = SessionStore::load();
    let was_logged_in = session.has_token();
    session.clear();
    session.save()?;
    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn cmd_whoami(as_json: bool) -> Result<()> {
    let session = SessionStore::load();
    let identity = parse_session_or_default(&session);

    let token = if session.has_token() {
        Some(mask_sensitive_value(session.token()))
    } else {
        None
    };

    let json = json!({
        "logged_in": session.has_token(),
        "role": identity.role,
        "subject_id": identity.subject_id,
        "email": identity.email,
        "journal_image": identity.journal_image,
        "token": token,
        "login_at": session.get(LOGIN_AT_KEY),
    });

    let text = if session.has_token() {
        let mut lines = vec![
            format!("email:   {}", identity.email.as_deref().unwrap_or("-")),
            format!("role:    {}", identity.role.as_deref().unwrap_or("-")),
        ];
        if let Some(scope) = identity.scope_id() {
            lines.push(format!("journal: {scope}"));
        }
        lines.push(format!("token:   {}", token.unwrap_or_default()));
        if let Some(at) = session.get(LOGIN_AT_KEY) {
            lines.push(format!("since:   {at}"));
        }
        lines.join("\n")
    } else {
        "Not logged in".to_string()
    };

    CommandOutput::new(json, text).print(as_json)
}
