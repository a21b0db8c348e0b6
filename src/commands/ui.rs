use crate::config::Config;
use crate::display::render_sidebar;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::ui_store::{UiAction, reduce_ui_state};

/// Apply one UI store action and persist the resulting state
pub fn cmd_ui(action: UiAction) -> Result<()> {
    let mut config = Config::load()?;
    let state = reduce_ui_state(config.ui_state(), action);
    config.apply_ui_state(&state);
    config.save()?;

    println!(
        "theme: {}, sidebar: {}",
        state.theme,
        if state.sidebar.visible { "visible" } else { "hidden" }
    );
    if let Some(sidebar) = render_sidebar(EntityKind::Journals, &state) {
        println!("{sidebar}");
    }
    Ok(())
}
