//! REST backend access.
//!
//! The list controller talks to the backend through [`EntityBackend`], which
//! [`ApiClient`] implements over HTTP. Response-shape tolerance (bare array
//! vs. `{ data: [...] }` envelope) lives here so callers only see arrays.

pub mod client;
pub mod error;

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::entity::EntitySpec;
use crate::error::Result;

pub use client::ApiClient;
pub use error::extract_error_message;

/// A file attached to a create/update submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Body of a create/update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub fields: Map<String, Value>,
    pub files: Vec<Attachment>,
}

/// Response of the derived (nested) endpoints: `{ success, ...payload }`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DerivedResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Operations the list controller needs from the backend
pub trait EntityBackend: Send + Sync {
    /// Fetch the whole collection, normalized to an array of raw records
    fn list(&self, spec: &EntitySpec) -> impl Future<Output = Result<Vec<Value>>> + Send;

    fn create(
        &self,
        spec: &EntitySpec,
        payload: &Payload,
    ) -> impl Future<Output = Result<()>> + Send;

    fn update(
        &self,
        spec: &EntitySpec,
        id: &str,
        payload: &Payload,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, spec: &EntitySpec, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Write a few fields of one record (used for optimistic single-field updates)
    fn patch(
        &self,
        spec: &EntitySpec,
        id: &str,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl<T: EntityBackend> EntityBackend for Arc<T> {
    fn list(&self, spec: &EntitySpec) -> impl Future<Output = Result<Vec<Value>>> + Send {
        (**self).list(spec)
    }

    fn create(
        &self,
        spec: &EntitySpec,
        payload: &Payload,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).create(spec, payload)
    }

    fn update(
        &self,
        spec: &EntitySpec,
        id: &str,
        payload: &Payload,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).update(spec, id, payload)
    }

    fn delete(&self, spec: &EntitySpec, id: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(spec, id)
    }

    fn patch(
        &self,
        spec: &EntitySpec,
        id: &str,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).patch(spec, id, fields)
    }
}

/// Normalize a list response to an array.
///
/// Accepts a bare array or an object with a `data` array. Anything else is
/// treated as an empty list.
pub fn normalize_list_body(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
