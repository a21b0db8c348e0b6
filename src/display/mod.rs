//! Terminal rendering of entity pages, records and notices.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::controller::{Notice, NoticeKind, PageView};
use crate::entity::{EntityKind, EntityRecord, EntitySpec};
use crate::ui_store::UiState;

/// Longest cell text before truncation in list tables
const MAX_CELL_WIDTH: usize = 48;

/// Entity navigation line, shown only while the sidebar is visible
pub fn render_sidebar(current: EntityKind, ui: &UiState) -> Option<String> {
    if !ui.sidebar.visible {
        return None;
    }
    let items: Vec<String> = EntityKind::ALL
        .iter()
        .map(|kind| {
            let label = if ui.sidebar.unfoldable {
                kind.as_str().chars().take(3).collect()
            } else {
                kind.as_str().to_string()
            };
            if *kind == current {
                let marked = format!("[{label}]");
                if ui.colors_enabled() {
                    marked.bold().cyan().to_string()
                } else {
                    marked
                }
            } else {
                label
            }
        })
        .collect();
    Some(items.join(" | "))
}

/// Table of the current page
pub fn render_page(spec: &EntitySpec, view: &PageView<'_>, ui: &UiState) -> String {
    if view.items.is_empty() {
        let text = if view.total_matches == 0 {
            format!("No {} found", spec.endpoint)
        } else {
            format!("Nothing on page {}", view.current_page)
        };
        return format!("{}\n{}", dim(&text, ui), page_footer(view));
    }

    let mut builder = Builder::default();
    builder.push_record(spec.columns.iter().map(|c| c.to_string()));
    for record in &view.items {
        builder.push_record(
            spec.columns
                .iter()
                .map(|column| truncate(&record.display(column), MAX_CELL_WIDTH)),
        );
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n{}", table, page_footer(view))
}

pub fn page_footer(view: &PageView<'_>) -> String {
    format!(
        "Page {} of {} ({} matching)",
        view.current_page, view.total_pages, view.total_matches
    )
}

/// Every field of one record, one per line
pub fn render_record(record: &EntityRecord, ui: &UiState) -> String {
    let width = record.fields().keys().map(String::len).max().unwrap_or(0);
    record
        .fields()
        .keys()
        .map(|key| {
            let label = format!("{key:width$}");
            let label = if ui.colors_enabled() {
                label.bold().to_string()
            } else {
                label
            };
            format!("{}  {}", label, record.display(key))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notice(notice: &Notice, ui: &UiState) -> String {
    match (notice.kind, ui.colors_enabled()) {
        (NoticeKind::Success, true) => notice.message.green().to_string(),
        (NoticeKind::Error, true) => notice.message.red().to_string(),
        (_, false) => notice.message.clone(),
    }
}

fn dim(text: &str, ui: &UiState) -> String {
    if ui.colors_enabled() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Truncate to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
pub fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}
