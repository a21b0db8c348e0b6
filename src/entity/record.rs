//! Transport records and journal reference normalization.

use serde::Serialize;
use serde_json::{Map, Value};

/// A journal reference after normalization.
///
/// The backend sends either a bare id or an expanded sub-document; both are
/// folded into this shape once, when the record enters the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRef {
    /// Only the foreign key was sent
    Unresolved(String),
    /// An expanded document was sent
    Resolved { id: String, name: Option<String> },
}

impl JournalRef {
    pub fn id(&self) -> &str {
        match self {
            JournalRef::Unresolved(id) => id,
            JournalRef::Resolved { id, .. } => id,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            JournalRef::Unresolved(_) => None,
            JournalRef::Resolved { name, .. } => name.as_deref(),
        }
    }
}

/// Normalize a journal reference value of either shape
pub fn resolve_ref(value: &Value) -> Option<JournalRef> {
    match value {
        Value::String(s) if !s.is_empty() => Some(JournalRef::Unresolved(s.clone())),
        Value::Number(n) => Some(JournalRef::Unresolved(n.to_string())),
        Value::Object(obj) => {
            let id = ["_id", "journalId", "id"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(scalar_to_string))
                .unwrap_or_default();
            let name = obj
                .get("journalName")
                .and_then(Value::as_str)
                .map(str::to_string);
            if id.is_empty() && name.is_none() {
                return None;
            }
            Some(JournalRef::Resolved { id, name })
        }
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generic string coercion used by the all-fields search and by rendering
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// One record of an entity collection, mirrored from the server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip)]
    owner: Option<JournalRef>,
}

impl EntityRecord {
    /// Wrap a field map, normalizing the journal reference held in `scope_field`
    pub fn new(fields: Map<String, Value>, scope_field: Option<&str>) -> Self {
        let owner = scope_field
            .and_then(|field| fields.get(field))
            .and_then(resolve_ref);
        Self { fields, owner }
    }

    /// Build from an arbitrary JSON value; non-objects are rejected
    pub fn from_value(value: Value, scope_field: Option<&str>) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields, scope_field)),
            _ => None,
        }
    }

    /// Record id (`_id`, falling back to `id`)
    pub fn id(&self) -> Option<String> {
        self.fields
            .get("_id")
            .or_else(|| self.fields.get("id"))
            .and_then(scalar_to_string)
    }

    pub fn owner(&self) -> Option<&JournalRef> {
        self.owner.as_ref()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String-valued field only
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Display text for a field; journal references render by name when expanded
    pub fn display(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(value @ Value::Object(_)) => match resolve_ref(value) {
                Some(JournalRef::Resolved {
                    name: Some(name), ..
                }) => name,
                Some(r) => r.id().to_string(),
                None => coerce_to_string(value),
            },
            Some(value) => coerce_to_string(value),
            None => String::new(),
        }
    }

    /// Set a field locally; used for optimistic patches
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
