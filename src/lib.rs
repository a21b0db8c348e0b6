pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod entity;
pub mod error;
pub mod listing;
pub mod session;
pub mod types;
pub mod ui_store;

pub use api::{ApiClient, Attachment, DerivedResponse, EntityBackend, Payload};
pub use config::Config;
pub use controller::{EntityListController, Modal, Notice, Outcome, PageView};
pub use entity::{EntityKind, EntityRecord, EntitySpec, JournalRef, resolve_ref};
pub use error::{AdminError, Result};
pub use listing::{Page, apply_role_scope, apply_search, paginate};
pub use session::{SessionIdentity, SessionStore, parse_session_or_default};
pub use ui_store::{Theme, UiAction, UiState, reduce_ui_state};
