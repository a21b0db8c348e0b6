//! Role scope, search, and pagination over a fetched working set.
//!
//! These are pure functions. Scope runs once per load; search and pagination
//! run on every render.

use crate::entity::record::coerce_to_string;
use crate::entity::{EntityRecord, EntitySpec, SearchMode};
use crate::session::SessionIdentity;

/// Keep only the records owned by a journal session's own journal.
///
/// Non-journal sessions, and journal sessions without a subject id, see
/// everything.
pub fn apply_role_scope(
    mut records: Vec<EntityRecord>,
    identity: &SessionIdentity,
) -> Vec<EntityRecord> {
    let Some(subject) = identity.scope_id() else {
        return records;
    };
    records.retain(|record| record.owner().is_some_and(|owner| owner.id() == subject));
    records
}

/// Records matching a free-text term, in their original order
pub fn apply_search<'a>(
    records: &'a [EntityRecord],
    term: &str,
    spec: &EntitySpec,
) -> Vec<&'a EntityRecord> {
    if term.trim().is_empty() {
        return records.iter().collect();
    }

    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_term(record, &needle, spec.search))
        .collect()
}

fn matches_term(record: &EntityRecord, needle: &str, mode: SearchMode) -> bool {
    match mode {
        SearchMode::Fields(fields) => {
            let in_fields = fields.iter().any(|field| {
                record
                    .get_str(field)
                    .is_some_and(|v| v.to_lowercase().contains(needle))
            });
            in_fields
                || record
                    .owner()
                    .and_then(|owner| owner.display_name())
                    .is_some_and(|name| name.to_lowercase().contains(needle))
        }
        SearchMode::AllFields => record
            .fields()
            .values()
            .any(|v| coerce_to_string(v).to_lowercase().contains(needle)),
    }
}

/// One page of a filtered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total_pages: usize,
}

/// Slice out page `page` (1-based) of `page_size` items.
///
/// An out-of-range page yields an empty slice. `page_size` must be positive;
/// zero is treated as one.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let items = if start >= items.len() {
        &items[..0]
    } else {
        let end = (start + page_size).min(items.len());
        &items[start..end]
    };
    Page { items, total_pages }
}
