//! Generic list/detail controller shared by every entity screen.
//!
//! One controller instance owns one screen's working set: it fetches the
//! whole collection, scopes it to the session's journal once, and then serves
//! search + pagination over it. Mutations go through a single modal at a
//! time and re-fetch on success. Nothing here returns an error to the caller
//! for a failed request; failures become [`Notice`]s.

pub mod state;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};

use crate::api::{Attachment, EntityBackend};
use crate::entity::{DeleteStrategy, EntityKind, EntityRecord, EntitySpec};
use crate::error::{AdminError, Result};
use crate::listing::{apply_role_scope, apply_search, paginate};
use crate::session::SessionIdentity;

pub use state::{FormState, ListState, LoadState, Modal, Notice, NoticeKind, Outcome};

/// The slice of records to render plus the numbers around it
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: Vec<&'a EntityRecord>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Records matching the search term, across all pages
    pub total_matches: usize,
}

pub struct EntityListController<B> {
    backend: B,
    spec: &'static EntitySpec,
    identity: SessionIdentity,
    list: ListState,
    load: LoadState,
    modal: Modal,
    notice: Option<Notice>,
}

impl<B: EntityBackend> EntityListController<B> {
    /// Identity is read once here; later session changes do not rescope the screen.
    pub fn new(backend: B, kind: EntityKind, identity: SessionIdentity, page_size: usize) -> Self {
        Self {
            backend,
            spec: kind.spec(),
            identity,
            list: ListState::new(page_size),
            load: LoadState::Idle,
            modal: Modal::Closed,
            notice: None,
        }
    }

    pub fn spec(&self) -> &'static EntitySpec {
        self.spec
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Fetch the whole collection and replace the working set.
    ///
    /// Failures are logged and leave an empty working set.
    pub async fn load_all(&mut self) {
        self.load = LoadState::Loading;
        match self.backend.list(self.spec).await {
            Ok(raw) => {
                let scope_field = self.spec.scope_field;
                let records: Vec<EntityRecord> = raw
                    .into_iter()
                    .filter_map(|value| EntityRecord::from_value(value, scope_field))
                    .collect();
                self.list.all_records = apply_role_scope(records, &self.identity);
                self.load = LoadState::Loaded;
                tracing::debug!(
                    "loaded {} {} record(s)",
                    self.list.all_records.len(),
                    self.spec.endpoint
                );
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}", self.spec.endpoint);
                self.list.all_records = Vec::new();
                self.load = LoadState::LoadFailed;
            }
        }
    }

    /// Change the search term; always returns to page 1
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.list.search_term = term.into();
        self.list.current_page = 1;
    }

    /// Change the page size; always returns to page 1
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(AdminError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }
        self.list.page_size = page_size;
        self.list.current_page = 1;
        Ok(())
    }

    /// Navigate to a page. Pages past the end are allowed and render empty.
    pub fn go_to_page(&mut self, page: usize) {
        self.list.current_page = page.max(1);
    }

    /// Working set after the search filter
    pub fn filtered(&self) -> Vec<&EntityRecord> {
        apply_search(&self.list.all_records, &self.list.search_term, self.spec)
    }

    /// The records to render for the current page
    pub fn page_view(&self) -> PageView<'_> {
        let filtered = self.filtered();
        let page = paginate(&filtered, self.list.page_size, self.list.current_page);
        PageView {
            items: page.items.to_vec(),
            current_page: self.list.current_page,
            total_pages: page.total_pages,
            total_matches: filtered.len(),
        }
    }

    // Modals

    /// Open the add modal with a fresh, role-aware form.
    ///
    /// Journal sessions are refused on entities they may not create.
    pub fn open_add(&mut self) -> Result<()> {
        if self.identity.is_journal() && !self.spec.journal_can_add {
            let err = AdminError::Auth(format!(
                "journal accounts cannot create a {}",
                self.spec.label
            ));
            self.notice = Some(Notice::error(err.user_message()));
            return Err(err);
        }
        let mut form = FormState::new();
        if let (Some(field), Some(subject)) = (self.spec.journal_field, self.identity.scope_id()) {
            form.lock(field, Value::String(subject.to_string()));
        }
        self.modal = Modal::Add(form);
        Ok(())
    }

    pub fn open_edit(&mut self, id: &str) -> Result<()> {
        let record = self
            .list
            .find(id)
            .ok_or_else(|| AdminError::RecordNotFound(id.to_string()))?;
        let mut form = FormState::from_record(record);
        if let (Some(field), Some(subject)) = (self.spec.journal_field, self.identity.scope_id()) {
            form.lock(field, Value::String(subject.to_string()));
        }
        self.modal = Modal::Edit {
            id: id.to_string(),
            form,
        };
        Ok(())
    }

    pub fn open_view(&mut self, id: &str) -> Result<&EntityRecord> {
        if self.list.find(id).is_none() {
            return Err(AdminError::RecordNotFound(id.to_string()));
        }
        self.modal = Modal::View { id: id.to_string() };
        self.list
            .find(id)
            .ok_or_else(|| AdminError::RecordNotFound(id.to_string()))
    }

    /// First step of a delete: ask for confirmation
    pub fn request_delete(&mut self, id: &str) -> Result<()> {
        if self.list.find(id).is_none() {
            return Err(AdminError::RecordNotFound(id.to_string()));
        }
        self.modal = Modal::DeleteConfirm { id: id.to_string() };
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Edit a field of the open form; locked fields are refused with a notice
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        let form = self
            .modal
            .form_mut()
            .ok_or_else(|| AdminError::Other("no form is open".to_string()))?;
        if let Err(e) = form.set(field, value) {
            self.notice = Some(Notice::error(e.to_string()));
            return Err(e);
        }
        Ok(())
    }

    pub fn attach_file(&mut self, attachment: Attachment) -> Result<()> {
        let spec = self.spec;
        let form = self
            .modal
            .form_mut()
            .ok_or_else(|| AdminError::Other("no form is open".to_string()))?;
        form.attach(spec, attachment)
    }

    // Mutations

    /// Submit the open add/edit form.
    ///
    /// On validation failure nothing is sent. On success the modal closes and
    /// the working set is re-fetched; on failure the modal stays open.
    pub async fn submit(&mut self) -> Outcome {
        let (id, form) = match &self.modal {
            Modal::Add(form) => (None, form),
            Modal::Edit { id, form } => (Some(id.clone()), form),
            _ => {
                self.notice = Some(Notice::error("no form is open"));
                return Outcome::Invalid;
            }
        };

        let missing = form.missing_required(self.spec);
        if !missing.is_empty() {
            let err = AdminError::Validation { missing };
            self.notice = Some(Notice::error(err.user_message()));
            return Outcome::Invalid;
        }

        let payload = form.to_payload();
        let result = match &id {
            None => self.backend.create(self.spec, &payload).await,
            Some(id) => self.backend.update(self.spec, id, &payload).await,
        };

        match result {
            Ok(()) => {
                let verb = if id.is_some() { "updated" } else { "created" };
                self.modal = Modal::Closed;
                self.notice = Some(Notice::success(format!("{} {verb}", self.spec.label)));
                self.load_all().await;
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {e}", self.spec.label);
                self.notice = Some(Notice::error(e.user_message()));
                Outcome::Failed
            }
        }
    }

    /// Second step of a delete; requires the confirmation modal to be open
    pub async fn confirm_delete(&mut self) -> Outcome {
        let Modal::DeleteConfirm { id } = &self.modal else {
            self.notice = Some(Notice::error("delete was not confirmed"));
            return Outcome::Invalid;
        };
        let id = id.clone();

        match self.backend.delete(self.spec, &id).await {
            Ok(()) => {
                self.modal = Modal::Closed;
                self.notice = Some(Notice::success(format!("{} deleted", self.spec.label)));
                match self.spec.delete {
                    DeleteStrategy::Refetch => self.load_all().await,
                    DeleteStrategy::LocalRemoval => self
                        .list
                        .all_records
                        .retain(|r| r.id().as_deref() != Some(id.as_str())),
                }
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("Failed to delete {} {id}: {e}", self.spec.label);
                self.notice = Some(Notice::error(e.user_message()));
                Outcome::Failed
            }
        }
    }

    /// Set one field locally, send it, then re-fetch.
    ///
    /// The local change is not reverted on failure; the next load reconciles it.
    pub async fn patch_field(&mut self, id: &str, field: &str, value: Value) -> Outcome {
        let Some(record) = self.list.find_mut(id) else {
            self.notice = Some(Notice::error(AdminError::RecordNotFound(id.to_string()).to_string()));
            return Outcome::Invalid;
        };
        record.set(field, value.clone());

        let mut fields = Map::new();
        fields.insert(field.to_string(), value);
        match self.backend.patch(self.spec, id, &fields).await {
            Ok(()) => {
                self.notice = Some(Notice::success(format!("{} updated", self.spec.label)));
                self.load_all().await;
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!("Failed to update {field} on {} {id}: {e}", self.spec.label);
                self.notice = Some(Notice::error(e.user_message()));
                Outcome::Failed
            }
        }
    }

    /// Mark a contact enquiry as read
    pub async fn mark_read(&mut self, id: &str) -> Outcome {
        self.patch_field(id, "isRead", Value::Bool(true)).await
    }
}
