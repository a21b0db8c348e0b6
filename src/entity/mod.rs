//! Entity screens and their configuration.
//!
//! Every entity collection is handled by the same list controller; what
//! differs per entity is captured in a static [`EntitySpec`].

pub mod record;

use std::fmt;
use std::str::FromStr;

use crate::error::AdminError;

pub use record::{EntityRecord, JournalRef, resolve_ref};

/// The six entity collections managed from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Journals,
    Articles,
    Editors,
    Manuscripts,
    Indexing,
    Contacts,
}

/// How a screen interprets its search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Match against a curated list of string-valued fields
    Fields(&'static [&'static str]),
    /// Match against every field value, coerced to a string
    AllFields,
}

/// What a screen does after a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    Refetch,
    /// Drop the record from the working set without a re-fetch
    LocalRemoval,
}

/// Static per-entity configuration
#[derive(Debug)]
pub struct EntitySpec {
    pub kind: EntityKind,
    /// Path of the collection under the API base URL
    pub endpoint: &'static str,
    /// Singular label used in messages
    pub label: &'static str,
    pub search: SearchMode,
    /// Fields that must be non-empty before create/update is attempted
    pub required: &'static [&'static str],
    /// Field whose (possibly expanded) journal reference decides role scope
    pub scope_field: Option<&'static str>,
    /// Form field holding the journal reference; pre-filled and locked for journal sessions
    pub journal_field: Option<&'static str>,
    /// Whether a journal session may open the add form
    pub journal_can_add: bool,
    /// Attachment fields; their presence makes every write multipart
    pub file_fields: &'static [&'static str],
    pub delete: DeleteStrategy,
    /// Columns shown in list output
    pub columns: &'static [&'static str],
}

impl EntitySpec {
    pub fn is_multipart(&self) -> bool {
        !self.file_fields.is_empty()
    }

    pub fn accepts_file(&self, field: &str) -> bool {
        self.file_fields.contains(&field)
    }
}

static JOURNALS: EntitySpec = EntitySpec {
    kind: EntityKind::Journals,
    endpoint: "journals",
    label: "journal",
    search: SearchMode::Fields(&["journalName", "issn", "eIssn", "category"]),
    required: &["journalName", "issn"],
    scope_field: Some("_id"),
    journal_field: None,
    journal_can_add: false,
    file_fields: &["journalImage", "bannerImage"],
    delete: DeleteStrategy::Refetch,
    columns: &["_id", "journalName", "issn", "category"],
};

static ARTICLES: EntitySpec = EntitySpec {
    kind: EntityKind::Articles,
    endpoint: "articles",
    label: "article",
    search: SearchMode::Fields(&["title", "authorName", "articleType"]),
    required: &["title", "journal", "authorName", "email"],
    scope_field: Some("journal"),
    journal_field: Some("journal"),
    journal_can_add: true,
    file_fields: &["pdfFile", "coverImage"],
    delete: DeleteStrategy::Refetch,
    columns: &["_id", "title", "authorName", "journal"],
};

static EDITORS: EntitySpec = EntitySpec {
    kind: EntityKind::Editors,
    endpoint: "editors",
    label: "editor",
    search: SearchMode::Fields(&["name", "email", "designation", "affiliation"]),
    required: &["name", "email", "journal"],
    scope_field: Some("journal"),
    journal_field: Some("journal"),
    journal_can_add: true,
    file_fields: &["editorImage"],
    delete: DeleteStrategy::Refetch,
    columns: &["_id", "name", "designation", "journal"],
};

static MANUSCRIPTS: EntitySpec = EntitySpec {
    kind: EntityKind::Manuscripts,
    endpoint: "manuscripts",
    label: "manuscript",
    search: SearchMode::Fields(&["title", "authorName", "email", "status"]),
    required: &["title", "authorName", "email", "journal"],
    scope_field: Some("journal"),
    journal_field: Some("journal"),
    journal_can_add: true,
    file_fields: &["manuscriptFile"],
    delete: DeleteStrategy::Refetch,
    columns: &["_id", "title", "authorName", "status", "journal"],
};

static INDEXING: EntitySpec = EntitySpec {
    kind: EntityKind::Indexing,
    endpoint: "indexing",
    label: "indexing entry",
    search: SearchMode::Fields(&["title"]),
    required: &["title", "journal"],
    scope_field: Some("journal"),
    journal_field: Some("journal"),
    journal_can_add: true,
    file_fields: &["image"],
    delete: DeleteStrategy::Refetch,
    columns: &["_id", "title", "journal"],
};

static CONTACTS: EntitySpec = EntitySpec {
    kind: EntityKind::Contacts,
    endpoint: "contacts",
    label: "enquiry",
    search: SearchMode::AllFields,
    required: &["name", "email", "message"],
    scope_field: None,
    journal_field: None,
    journal_can_add: true,
    file_fields: &[],
    delete: DeleteStrategy::LocalRemoval,
    columns: &["_id", "name", "email", "subject", "isRead"],
};

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Journals,
        EntityKind::Articles,
        EntityKind::Editors,
        EntityKind::Manuscripts,
        EntityKind::Indexing,
        EntityKind::Contacts,
    ];

    pub fn spec(self) -> &'static EntitySpec {
        match self {
            EntityKind::Journals => &JOURNALS,
            EntityKind::Articles => &ARTICLES,
            EntityKind::Editors => &EDITORS,
            EntityKind::Manuscripts => &MANUSCRIPTS,
            EntityKind::Indexing => &INDEXING,
            EntityKind::Contacts => &CONTACTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.spec().endpoint
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "journals" | "journal" => Ok(EntityKind::Journals),
            "articles" | "article" => Ok(EntityKind::Articles),
            "editors" | "editor" => Ok(EntityKind::Editors),
            "manuscripts" | "manuscript" => Ok(EntityKind::Manuscripts),
            "indexing" | "indexes" => Ok(EntityKind::Indexing),
            "contacts" | "contact" | "enquiries" => Ok(EntityKind::Contacts),
            _ => Err(AdminError::UnknownEntity(s.to_string())),
        }
    }
}
