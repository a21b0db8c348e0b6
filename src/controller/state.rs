//! State types for the entity list controller

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::api::{Attachment, Payload};
use crate::entity::record::coerce_to_string;
use crate::entity::{EntityRecord, EntitySpec, resolve_ref};
use crate::error::{AdminError, Result};

/// Fields the server owns; never copied into an edit form
const SERVER_FIELDS: &[&str] = &["_id", "id", "__v", "createdAt", "updatedAt"];

/// Lifecycle of the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The fetch failed; the working set was replaced with nothing
    LoadFailed,
}

/// Per-screen working set and view settings
#[derive(Debug, Clone)]
pub struct ListState {
    /// Server truth after role scope, in server order
    pub all_records: Vec<EntityRecord>,
    pub search_term: String,
    pub page_size: usize,
    /// 1-based; not clamped when the data shrinks
    pub current_page: usize,
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            all_records: Vec::new(),
            search_term: String::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn find(&self, id: &str) -> Option<&EntityRecord> {
        self.all_records
            .iter()
            .find(|r| r.id().as_deref() == Some(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut EntityRecord> {
        self.all_records
            .iter_mut()
            .find(|r| r.id().as_deref() == Some(id))
    }
}

/// Working form behind the add and edit modals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: Map<String, Value>,
    files: Vec<Attachment>,
    /// Fields the session may not change (the journal selector for journal users)
    locked: BTreeSet<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill from an existing record, collapsing expanded journal references to their id
    pub fn from_record(record: &EntityRecord) -> Self {
        let fields = record
            .fields()
            .iter()
            .filter(|(key, _)| !SERVER_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(_) => match resolve_ref(value) {
                        Some(r) if !r.id().is_empty() => Value::String(r.id().to_string()),
                        _ => value.clone(),
                    },
                    other => other.clone(),
                };
                (key.clone(), value)
            })
            .collect();
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Fix a field to a value the user cannot change
    pub fn lock(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
        self.locked.insert(field.to_string());
    }

    pub fn is_locked(&self, field: &str) -> bool {
        self.locked.contains(field)
    }

    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        if self.is_locked(field) {
            return Err(AdminError::Other(format!("field '{field}' cannot be changed")));
        }
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    /// Attach a file, replacing any earlier attachment for the same field
    pub fn attach(&mut self, spec: &EntitySpec, attachment: Attachment) -> Result<()> {
        if !spec.accepts_file(&attachment.field) {
            return Err(AdminError::Other(format!(
                "{} has no file field '{}'; expected one of: {}",
                spec.label,
                attachment.field,
                if spec.file_fields.is_empty() {
                    "(none)".to_string()
                } else {
                    spec.file_fields.join(", ")
                }
            )));
        }
        self.files.retain(|a| a.field != attachment.field);
        self.files.push(attachment);
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    /// Required fields that are absent or blank, in declaration order
    pub fn missing_required(&self, spec: &EntitySpec) -> Vec<String> {
        spec.required
            .iter()
            .filter(|field| {
                self.fields
                    .get(**field)
                    .is_none_or(|v| coerce_to_string(v).trim().is_empty())
            })
            .map(|field| field.to_string())
            .collect()
    }

    pub fn to_payload(&self) -> Payload {
        Payload {
            fields: self.fields.clone(),
            files: self.files.clone(),
        }
    }
}

/// At most one modal is open per screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    Closed,
    Add(FormState),
    Edit { id: String, form: FormState },
    View { id: String },
    DeleteConfirm { id: String },
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn form(&self) -> Option<&FormState> {
        match self {
            Modal::Add(form) | Modal::Edit { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        match self {
            Modal::Add(form) | Modal::Edit { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Modal::Closed => "closed",
            Modal::Add(_) => "add",
            Modal::Edit { .. } => "edit",
            Modal::View { .. } => "view",
            Modal::DeleteConfirm { .. } => "delete-confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Alert-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Result of a create, update, delete, or patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Rejected before any network call
    Invalid,
    /// The request was sent and failed
    Failed,
}
