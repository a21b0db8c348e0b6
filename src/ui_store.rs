//! Application UI store
//!
//! Holds the few cross-cutting presentation flags (sidebar visibility and
//! theme) as named slices. Transitions are pure: `reduce_ui_state` takes the
//! current state and an action and returns the next state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

/// Color theme used when rendering output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// No colors at all
    Plain,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::Plain => write!(f, "plain"),
        }
    }
}

impl FromStr for Theme {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "plain" => Ok(Theme::Plain),
            _ => Err(AdminError::Config(format!(
                "unknown theme '{}', expected 'light', 'dark' or 'plain'",
                s
            ))),
        }
    }
}

/// Sidebar slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarState {
    pub visible: bool,
    /// Collapsed to icons only
    pub unfoldable: bool,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self {
            visible: true,
            unfoldable: false,
        }
    }
}

/// The whole UI store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    pub sidebar: SidebarState,
    pub theme: Theme,
}

impl UiState {
    pub fn colors_enabled(&self) -> bool {
        self.theme != Theme::Plain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ToggleSidebar,
    SetSidebar(bool),
    ToggleUnfoldable,
    SetTheme(Theme),
}

/// Reduce a UI action into the next state
pub fn reduce_ui_state(mut state: UiState, action: UiAction) -> UiState {
    match action {
        UiAction::ToggleSidebar => state.sidebar.visible = !state.sidebar.visible,
        UiAction::SetSidebar(visible) => state.sidebar.visible = visible,
        UiAction::ToggleUnfoldable => state.sidebar.unfoldable = !state.sidebar.unfoldable,
        UiAction::SetTheme(theme) => state.theme = theme,
    }
    state
}
