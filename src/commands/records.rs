//! Entity screen commands: list, show, create, update, delete, mark-read.
//!
//! Each command mounts one list controller over the API client, drives it
//! through the same steps the dashboard screen would, and prints the result.

use std::path::Path;

use serde_json::{Value, json};

use super::interactive::confirm;
use super::{AppContext, CommandOutput, block_on, parse_key_value};
use crate::api::{ApiClient, Attachment};
use crate::controller::{EntityListController, Outcome};
use crate::display::{render_notice, render_page, render_record, render_sidebar};
use crate::entity::EntityKind;
use crate::error::{AdminError, Result};
use crate::session::parse_session_or_default;
use crate::types::GENERIC_FAILURE_MESSAGE;
use crate::ui_store::UiState;

/// Options for `list`
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub search: Option<String>,
    pub page: usize,
    pub page_size: Option<usize>,
    pub json: bool,
}

/// Raw `key=value` and `field=path` arguments for create/update
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub fields: Vec<String>,
    pub files: Vec<String>,
}

fn mount(ctx: &AppContext, kind: EntityKind) -> Result<EntityListController<ApiClient>> {
    let client = ApiClient::from_config(&ctx.config, &ctx.session)?;
    let identity = parse_session_or_default(&ctx.session);
    Ok(EntityListController::new(
        client,
        kind,
        identity,
        ctx.config.page_size,
    ))
}

pub fn cmd_list(kind: EntityKind, opts: ListOptions) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, kind)?;
        screen.load_all().await;

        if let Some(size) = opts.page_size {
            screen.set_page_size(size)?;
        }
        if let Some(term) = opts.search {
            screen.set_search_term(term);
        }
        screen.go_to_page(opts.page);

        let view = screen.page_view();
        let json = json!({
            "entity": kind.as_str(),
            "page": view.current_page,
            "total_pages": view.total_pages,
            "total_matches": view.total_matches,
            "records": view.items,
        });

        let mut text = String::new();
        if let Some(sidebar) = render_sidebar(kind, &ui) {
            text.push_str(&sidebar);
            text.push_str("\n\n");
        }
        text.push_str(&render_page(screen.spec(), &view, &ui));

        CommandOutput::new(json, text).print(opts.json)
    })?
}

pub fn cmd_show(kind: EntityKind, id: &str, as_json: bool) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, kind)?;
        screen.load_all().await;
        let record = screen.open_view(id)?;
        let json = serde_json::to_value(record)?;
        let text = render_record(record, &ui);
        CommandOutput::new(json, text).print(as_json)
    })?
}

pub fn cmd_create(kind: EntityKind, opts: WriteOptions) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, kind)?;
        screen.open_add()?;
        fill_form(&mut screen, &opts).await?;
        let outcome = screen.submit().await;
        report(&mut screen, outcome, &ui)
    })?
}

pub fn cmd_update(kind: EntityKind, id: &str, opts: WriteOptions) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, kind)?;
        screen.load_all().await;
        screen.open_edit(id)?;
        fill_form(&mut screen, &opts).await?;
        let outcome = screen.submit().await;
        report(&mut screen, outcome, &ui)
    })?
}

pub fn cmd_delete(kind: EntityKind, id: &str, yes: bool) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, kind)?;
        screen.load_all().await;
        screen.request_delete(id)?;

        if !yes && !confirm(&format!("Delete {} {}", screen.spec().label, id))? {
            screen.close_modal();
            println!("Aborted");
            return Ok(());
        }

        let outcome = screen.confirm_delete().await;
        report(&mut screen, outcome, &ui)
    })?
}

pub fn cmd_mark_read(id: &str) -> Result<()> {
    let ctx = AppContext::authenticated()?;
    let ui = ctx.config.ui_state();

    block_on(async move {
        let mut screen = mount(&ctx, EntityKind::Contacts)?;
        screen.load_all().await;
        let outcome = screen.mark_read(id).await;
        report(&mut screen, outcome, &ui)
    })?
}

async fn fill_form(screen: &mut EntityListController<ApiClient>, opts: &WriteOptions) -> Result<()> {
    for arg in &opts.fields {
        let (field, value) = parse_key_value(arg)?;
        screen.set_field(&field, Value::String(value))?;
    }
    for arg in &opts.files {
        let (field, path) = parse_key_value(arg)?;
        let attachment = read_attachment(field, Path::new(&path)).await?;
        screen.attach_file(attachment)?;
    }
    Ok(())
}

async fn read_attachment(field: String, path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AdminError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Attachment {
        field,
        file_name,
        bytes,
    })
}

/// Print the screen's notice; failed or invalid mutations become a command error
fn report(
    screen: &mut EntityListController<ApiClient>,
    outcome: Outcome,
    ui: &UiState,
) -> Result<()> {
    let notice = screen.take_notice();
    match outcome {
        Outcome::Completed => {
            if let Some(notice) = notice {
                println!("{}", render_notice(&notice, ui));
            }
            Ok(())
        }
        Outcome::Invalid | Outcome::Failed => Err(AdminError::Other(
            notice
                .map(|n| n.message)
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        )),
    }
}
