//! Read-only lookups against the nested endpoints (issues and articles by journal or issue).

use std::fmt;

use serde_json::Value;

use super::{AppContext, CommandOutput, block_on};
use crate::api::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// All issues published by a journal
    IssueArchive,
    LatestIssue,
    IssueArticles,
    JournalArticles,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::IssueArchive => write!(f, "issue archive"),
            LookupKind::LatestIssue => write!(f, "latest issue"),
            LookupKind::IssueArticles => write!(f, "articles in issue"),
            LookupKind::JournalArticles => write!(f, "articles in journal"),
        }
    }
}

pub fn cmd_lookup(kind: LookupKind, id: &str, as_json: bool) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let client = ApiClient::from_config(&ctx.config, &ctx.session)?;

    let response = block_on(async {
        match kind {
            LookupKind::IssueArchive => client.issues_by_journal(id).await,
            LookupKind::LatestIssue => client.latest_issue(id).await,
            LookupKind::IssueArticles => client.articles_by_issue(id).await,
            LookupKind::JournalArticles => client.articles_by_journal(id).await,
        }
    })??;

    let payload = Value::Object(response.payload);
    let text = format!(
        "{} for {}:\n{}",
        kind,
        id,
        serde_json::to_string_pretty(&payload)?
    );
    CommandOutput::new(payload, text).print(as_json)
}
