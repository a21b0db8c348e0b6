//! Controller tests against an in-memory backend.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value, json};

use crate::api::{Attachment, EntityBackend, Payload};
use crate::entity::{EntityKind, EntitySpec};
use crate::error::{AdminError, Result};
use crate::session::SessionIdentity;
use crate::types::GENERIC_FAILURE_MESSAGE;

use super::{EntityListController, LoadState, Modal, NoticeKind, Outcome};

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Create(Payload),
    Update(String, Payload),
    Delete(String),
    Patch(String, Map<String, Value>),
}

#[derive(Default)]
struct MockBackend {
    records: Mutex<Vec<Value>>,
    /// Wrap the list in `{ data: [...] }`
    envelope: bool,
    fail_list: Mutex<bool>,
    /// Error returned by the next mutation
    reject: Mutex<Option<AdminError>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    fn with_records(records: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn reject_next(&self, status: u16, message: &str) {
        *self.reject.lock().unwrap() = Some(AdminError::Api {
            status,
            message: message.to_string(),
        });
    }

    fn take_rejection(&self) -> Result<()> {
        match self.reject.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl EntityBackend for MockBackend {
    async fn list(&self, _spec: &EntitySpec) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(Call::List);
        if *self.fail_list.lock().unwrap() {
            return Err(AdminError::Other("connection refused".to_string()));
        }
        let records = self.records.lock().unwrap().clone();
        let body = if self.envelope {
            json!({ "data": records })
        } else {
            Value::Array(records)
        };
        Ok(crate::api::normalize_list_body(body))
    }

    async fn create(&self, _spec: &EntitySpec, payload: &Payload) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Create(payload.clone()));
        self.take_rejection()?;
        let mut record = payload.fields.clone();
        let id = format!("new-{}", self.records.lock().unwrap().len());
        record.insert("_id".to_string(), Value::String(id));
        self.records.lock().unwrap().push(Value::Object(record));
        Ok(())
    }

    async fn update(&self, _spec: &EntitySpec, id: &str, payload: &Payload) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(id.to_string(), payload.clone()));
        self.take_rejection()
    }

    async fn delete(&self, _spec: &EntitySpec, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Delete(id.to_string()));
        self.take_rejection()?;
        self.records
            .lock()
            .unwrap()
            .retain(|r| r.get("_id").and_then(Value::as_str) != Some(id));
        Ok(())
    }

    async fn patch(&self, _spec: &EntitySpec, id: &str, fields: &Map<String, Value>) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Patch(id.to_string(), fields.clone()));
        self.take_rejection()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn numbered(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"_id": format!("r{i}"), "title": format!("Record {i}"), "journal": "J1"}))
        .collect()
}

fn admin() -> SessionIdentity {
    SessionIdentity {
        role: Some("admin".to_string()),
        ..Default::default()
    }
}

fn journal_user(id: &str) -> SessionIdentity {
    SessionIdentity {
        role: Some("journal".to_string()),
        subject_id: Some(id.to_string()),
        ..Default::default()
    }
}

fn controller(
    backend: &Arc<MockBackend>,
    kind: EntityKind,
    identity: SessionIdentity,
) -> EntityListController<Arc<MockBackend>> {
    EntityListController::new(Arc::clone(backend), kind, identity, 10)
}

fn visible_ids(c: &EntityListController<Arc<MockBackend>>) -> Vec<String> {
    c.page_view().items.iter().filter_map(|r| r.id()).collect()
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_all_replaces_working_set() {
    let backend = MockBackend::with_records(numbered(3));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    assert_eq!(c.load_state(), LoadState::Idle);

    c.load_all().await;
    assert_eq!(c.load_state(), LoadState::Loaded);
    assert_eq!(c.list_state().all_records.len(), 3);

    *backend.records.lock().unwrap() = numbered(1);
    c.load_all().await;
    assert_eq!(c.list_state().all_records.len(), 1);
}

#[tokio::test]
async fn test_envelope_and_bare_array_load_the_same() {
    let bare = MockBackend::with_records(numbered(4));
    let envelope = Arc::new(MockBackend {
        records: Mutex::new(numbered(4)),
        envelope: true,
        ..Default::default()
    });

    let mut a = controller(&bare, EntityKind::Articles, admin());
    let mut b = controller(&envelope, EntityKind::Articles, admin());
    a.load_all().await;
    b.load_all().await;
    assert_eq!(a.list_state().all_records, b.list_state().all_records);
}

#[tokio::test]
async fn test_failed_load_is_soft_and_empty() {
    let backend = MockBackend::with_records(numbered(5));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    assert_eq!(c.list_state().all_records.len(), 5);

    *backend.fail_list.lock().unwrap() = true;
    c.load_all().await;
    assert_eq!(c.load_state(), LoadState::LoadFailed);
    assert!(c.list_state().all_records.is_empty());
    assert!(c.notice().is_none(), "list failures are logged, not shown");
}

#[tokio::test]
async fn test_non_object_items_are_dropped() {
    let backend = MockBackend::with_records(vec![json!({"_id": "a"}), json!("junk"), json!(3)]);
    let mut c = controller(&backend, EntityKind::Contacts, admin());
    c.load_all().await;
    assert_eq!(c.list_state().all_records.len(), 1);
}

// ============================================================================
// Role scope
// ============================================================================

#[tokio::test]
async fn test_journal_session_sees_only_own_records() {
    let backend = MockBackend::with_records(vec![
        json!({"_id": "0", "journal": "J1"}),
        json!({"_id": "1", "journal": "J2"}),
        json!({"_id": "2", "journal": {"_id": "J1", "journalName": "Acta"}}),
    ]);
    let mut c = controller(&backend, EntityKind::Manuscripts, journal_user("J1"));
    c.load_all().await;
    assert_eq!(visible_ids(&c), vec!["0", "2"]);
}

#[tokio::test]
async fn test_identity_is_fixed_at_construction() {
    let backend = MockBackend::with_records(vec![
        json!({"_id": "0", "journal": "J1"}),
        json!({"_id": "1", "journal": "J2"}),
    ]);
    let mut c = controller(&backend, EntityKind::Editors, journal_user("J2"));
    c.load_all().await;
    c.load_all().await;
    assert_eq!(visible_ids(&c), vec!["1"]);
    assert_eq!(c.identity().subject_id.as_deref(), Some("J2"));
}

// ============================================================================
// Search and pagination
// ============================================================================

#[tokio::test]
async fn test_pagination_of_23_records() {
    let backend = MockBackend::with_records(numbered(23));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.go_to_page(3);

    let view = c.page_view();
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.total_matches, 23);
}

#[tokio::test]
async fn test_search_change_resets_to_first_page() {
    let backend = MockBackend::with_records(numbered(45));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;

    c.go_to_page(4);
    assert_eq!(c.list_state().current_page, 4);
    c.set_search_term("record");
    assert_eq!(c.list_state().current_page, 1);

    c.go_to_page(4);
    c.set_search_term("record 1");
    assert_eq!(c.list_state().current_page, 1);
    // "Record 1" and "Record 10".."Record 19"
    assert_eq!(c.page_view().total_matches, 11);
}

#[tokio::test]
async fn test_page_size_change_resets_to_first_page() {
    let backend = MockBackend::with_records(numbered(30));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.go_to_page(2);

    c.set_page_size(25).unwrap();
    assert_eq!(c.list_state().current_page, 1);
    assert_eq!(c.page_view().total_pages, 2);
    assert!(c.set_page_size(0).is_err());
    assert_eq!(c.list_state().page_size, 25);
}

#[tokio::test]
async fn test_bare_and_expanded_refs_without_name_search_identically() {
    let bare = MockBackend::with_records(vec![
        json!({"_id": "a", "title": "Ocean tides", "journal": "J1"}),
        json!({"_id": "b", "title": "Dunes", "journal": "J2"}),
    ]);
    let expanded = MockBackend::with_records(vec![
        json!({"_id": "a", "title": "Ocean tides", "journal": {"_id": "J1"}}),
        json!({"_id": "b", "title": "Dunes", "journal": {"_id": "J2"}}),
    ]);
    let mut bare_screen = controller(&bare, EntityKind::Articles, journal_user("J1"));
    let mut expanded_screen = controller(&expanded, EntityKind::Articles, journal_user("J1"));
    bare_screen.load_all().await;
    expanded_screen.load_all().await;

    for term in ["", "ocean", "j1", "dunes"] {
        bare_screen.set_search_term(term);
        expanded_screen.set_search_term(term);
        assert_eq!(visible_ids(&bare_screen), visible_ids(&expanded_screen), "term {term:?}");
    }
}

#[tokio::test]
async fn test_search_matches_expanded_journal_name_only_when_expanded() {
    let backend = MockBackend::with_records(vec![
        json!({"_id": "a", "title": "x", "journal": {"_id": "J1", "journalName": "Ocean Letters"}}),
        json!({"_id": "b", "title": "y", "journal": "J1"}),
    ]);
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.set_search_term("ocean");
    assert_eq!(visible_ids(&c), vec!["a"]);
}

// ============================================================================
// Modals and mutations
// ============================================================================

#[tokio::test]
async fn test_open_add_prefills_and_locks_journal_for_journal_users() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Articles, journal_user("J1"));
    c.open_add().unwrap();

    let form = c.modal().form().unwrap();
    assert_eq!(form.get("journal"), Some(&json!("J1")));
    assert!(form.is_locked("journal"));

    assert!(c.set_field("journal", json!("J2")).is_err());
    assert_eq!(c.notice().map(|n| n.kind), Some(NoticeKind::Error));
}

#[tokio::test]
async fn test_open_add_resets_previous_form() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Editors, admin());
    c.open_add().unwrap();
    c.set_field("name", json!("Draft")).unwrap();
    c.close_modal();
    c.open_add().unwrap();
    assert_eq!(c.modal().form().unwrap().get("name"), None);
    assert!(!c.modal().form().unwrap().is_locked("journal"));
}

#[tokio::test]
async fn test_journal_session_cannot_add_journals() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Journals, journal_user("J1"));

    assert!(c.open_add().is_err());
    assert!(!c.modal().is_open());
    assert_eq!(c.notice().map(|n| n.kind), Some(NoticeKind::Error));

    assert!(c.set_field("journalName", json!("Acta")).is_err());
    assert_eq!(c.submit().await, Outcome::Invalid);
    assert!(backend.calls().is_empty());

    let mut admin_screen = controller(&backend, EntityKind::Journals, admin());
    assert!(admin_screen.open_add().is_ok());
}

#[tokio::test]
async fn test_validation_failure_sends_nothing() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.open_add().unwrap();
    c.set_field("title", json!("On Rust")).unwrap();

    assert_eq!(c.submit().await, Outcome::Invalid);
    assert!(backend.calls().is_empty());
    assert!(matches!(c.modal(), Modal::Add(_)));
    let notice = c.notice().unwrap();
    assert!(notice.message.contains("journal"));
    assert!(notice.message.contains("authorName"));
    assert!(notice.message.contains("email"));
}

#[tokio::test]
async fn test_successful_create_closes_modal_and_refetches() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.open_add().unwrap();
    for (field, value) in [
        ("title", "On Rust"),
        ("journal", "J1"),
        ("authorName", "Ferris"),
        ("email", "ferris@example.org"),
    ] {
        c.set_field(field, json!(value)).unwrap();
    }

    assert_eq!(c.submit().await, Outcome::Completed);
    assert_eq!(c.modal(), &Modal::Closed);
    assert_eq!(c.list_state().all_records.len(), 1);
    assert_eq!(c.notice().unwrap().kind, NoticeKind::Success);

    let calls = backend.calls();
    assert!(matches!(calls[1], Call::Create(_)));
    assert_eq!(calls.last(), Some(&Call::List), "refetch starts after the create returns");
}

#[tokio::test]
async fn test_rejected_create_keeps_modal_and_shows_server_message() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Journals, admin());
    c.open_add().unwrap();
    c.set_field("journalName", json!("Acta")).unwrap();
    c.set_field("issn", json!("1234-5678")).unwrap();
    backend.reject_next(422, "Duplicate ISSN");

    assert_eq!(c.submit().await, Outcome::Failed);
    assert!(matches!(c.modal(), Modal::Add(_)));
    assert_eq!(c.notice().unwrap().message, "Duplicate ISSN");
    assert!(!backend.calls().contains(&Call::List));
}

fn open_contact_form(c: &mut EntityListController<Arc<MockBackend>>) {
    c.open_add().unwrap();
    c.set_field("name", json!("Kim")).unwrap();
    c.set_field("email", json!("kim@example.org")).unwrap();
    c.set_field("message", json!("hello")).unwrap();
}

#[tokio::test]
async fn test_transport_failure_uses_generic_message() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Contacts, admin());
    open_contact_form(&mut c);
    *backend.reject.lock().unwrap() = Some(AdminError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    )));
    assert_eq!(c.submit().await, Outcome::Failed);
    assert_eq!(c.notice().unwrap().message, GENERIC_FAILURE_MESSAGE);

    *backend.reject.lock().unwrap() = Some(AdminError::Json(
        serde_json::from_str::<Value>("{").unwrap_err(),
    ));
    assert_eq!(c.submit().await, Outcome::Failed);
    assert_eq!(c.notice().unwrap().message, GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_client_side_failure_shows_its_own_text() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Contacts, admin());
    open_contact_form(&mut c);
    *backend.reject.lock().unwrap() = Some(AdminError::Other("path segment must not be empty".to_string()));

    assert_eq!(c.submit().await, Outcome::Failed);
    assert_eq!(c.notice().unwrap().message, "path segment must not be empty");
    assert!(matches!(c.modal(), Modal::Add(_)));
}

#[tokio::test]
async fn test_edit_sends_update_with_collapsed_journal_ref() {
    let backend = MockBackend::with_records(vec![json!({
        "_id": "e1",
        "name": "Ana",
        "email": "ana@example.org",
        "journal": {"_id": "J1", "journalName": "Acta"}
    })]);
    let mut c = controller(&backend, EntityKind::Editors, admin());
    c.load_all().await;
    c.open_edit("e1").unwrap();
    c.set_field("name", json!("Ana B.")).unwrap();

    assert_eq!(c.submit().await, Outcome::Completed);
    let update = backend
        .calls()
        .into_iter()
        .find_map(|call| match call {
            Call::Update(id, payload) => Some((id, payload)),
            _ => None,
        })
        .unwrap();
    assert_eq!(update.0, "e1");
    assert_eq!(update.1.fields["journal"], json!("J1"));
    assert_eq!(update.1.fields["name"], json!("Ana B."));
    assert!(!update.1.fields.contains_key("_id"));
}

#[tokio::test]
async fn test_open_edit_unknown_record() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Editors, admin());
    c.load_all().await;
    assert!(c.open_edit("missing").is_err());
    assert_eq!(c.modal(), &Modal::Closed);
}

#[tokio::test]
async fn test_attachments_travel_with_payload() {
    let backend = MockBackend::with_records(vec![]);
    let mut c = controller(&backend, EntityKind::Indexing, admin());
    c.open_add().unwrap();
    c.set_field("title", json!("Scopus")).unwrap();
    c.set_field("journal", json!("J1")).unwrap();
    c.attach_file(Attachment {
        field: "image".to_string(),
        file_name: "scopus.png".to_string(),
        bytes: vec![0x89, 0x50],
    })
    .unwrap();

    assert_eq!(c.submit().await, Outcome::Completed);
    let Call::Create(payload) = &backend.calls()[0] else {
        panic!("expected create");
    };
    assert_eq!(payload.files.len(), 1);
    assert_eq!(payload.files[0].file_name, "scopus.png");
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let backend = MockBackend::with_records(numbered(2));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;

    assert_eq!(c.confirm_delete().await, Outcome::Invalid);
    assert!(!backend.calls().iter().any(|call| matches!(call, Call::Delete(_))));

    c.request_delete("r0").unwrap();
    assert!(matches!(c.modal(), Modal::DeleteConfirm { .. }));
    assert_eq!(c.confirm_delete().await, Outcome::Completed);
    assert_eq!(c.list_state().all_records.len(), 1);
}

#[tokio::test]
async fn test_delete_leaves_stale_page() {
    let backend = MockBackend::with_records(numbered(11));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.go_to_page(2);
    assert_eq!(visible_ids(&c), vec!["r10"]);

    c.request_delete("r10").unwrap();
    assert_eq!(c.confirm_delete().await, Outcome::Completed);

    let view = c.page_view();
    assert_eq!(c.list_state().all_records.len(), 10);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.current_page, 2);
    assert!(view.items.is_empty());
}

#[tokio::test]
async fn test_contacts_delete_removes_locally_without_refetch() {
    let backend = MockBackend::with_records(vec![
        json!({"_id": "c1", "name": "Kim"}),
        json!({"_id": "c2", "name": "Lu"}),
    ]);
    let mut c = controller(&backend, EntityKind::Contacts, admin());
    c.load_all().await;
    c.request_delete("c1").unwrap();
    assert_eq!(c.confirm_delete().await, Outcome::Completed);

    assert_eq!(visible_ids(&c), vec!["c2"]);
    let lists = backend.calls().iter().filter(|call| **call == Call::List).count();
    assert_eq!(lists, 1);
}

#[tokio::test]
async fn test_failed_delete_keeps_confirmation_open() {
    let backend = MockBackend::with_records(numbered(1));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.request_delete("r0").unwrap();
    backend.reject_next(403, "Forbidden");

    assert_eq!(c.confirm_delete().await, Outcome::Failed);
    assert!(matches!(c.modal(), Modal::DeleteConfirm { .. }));
    assert_eq!(c.notice().unwrap().message, "Forbidden");
    assert_eq!(c.list_state().all_records.len(), 1);
}

#[tokio::test]
async fn test_mark_read_patches_optimistically() {
    let backend = MockBackend::with_records(vec![json!({"_id": "c1", "isRead": false})]);
    let mut c = controller(&backend, EntityKind::Contacts, admin());
    c.load_all().await;
    backend.reject_next(500, "boom");

    assert_eq!(c.mark_read("c1").await, Outcome::Failed);
    assert_eq!(
        c.list_state().all_records[0].get("isRead"),
        Some(&json!(true)),
        "local patch stays until the next fetch"
    );

    let mut expected = Map::new();
    expected.insert("isRead".to_string(), json!(true));
    assert!(backend.calls().contains(&Call::Patch("c1".to_string(), expected)));
}

#[tokio::test]
async fn test_at_most_one_modal() {
    let backend = MockBackend::with_records(numbered(1));
    let mut c = controller(&backend, EntityKind::Articles, admin());
    c.load_all().await;
    c.open_add().unwrap();
    c.open_view("r0").unwrap();
    assert_eq!(c.modal().name(), "view");
    c.request_delete("r0").unwrap();
    assert_eq!(c.modal().name(), "delete-confirm");
    c.close_modal();
    assert!(!c.modal().is_open());
}
