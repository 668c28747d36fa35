//! Ephemeral overlay UI state (panels, live geometry, gesture flags).
//!
//! DESIGN
//! ======
//! Nothing here survives a reload. On mount it is rebuilt from the durable
//! settings and the object store; during a gesture it holds the live,
//! uncommitted position so input stays responsive without durable writes.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use crate::overlay::geometry::{Position, Size};
use crate::state::observable::Observable;

/// Observable handle to the shared UI state.
pub type UiStore = Observable<UiState>;

/// Process-lifetime UI state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub show_alignment_popover: bool,
    pub show_design_list_panel: bool,
    pub show_grid_settings_panel: bool,
    /// Display URL of the design currently on screen.
    pub design_url: Option<String>,
    /// Size the overlay is drawn at right now (scale and zoom applied).
    pub design_size: Size,
    /// Intrinsic pixel size of the decoded design.
    pub design_original_size: Size,
    /// Live position; committed to settings only when a gesture finishes.
    pub design_cached_position: Position,
    pub is_solid_mode: bool,
    pub is_zoom_mode: bool,
    pub is_dragging: bool,
    /// Animate the next size/position change; cleared on transition end.
    pub enable_animation: bool,
    pub error_message: Option<String>,
}

impl UiState {
    /// Open or close the design list. Opening it closes the other panels.
    pub fn toggle_design_list_panel(&mut self) {
        self.show_design_list_panel = !self.show_design_list_panel;
        if self.show_design_list_panel {
            self.show_grid_settings_panel = false;
            self.show_alignment_popover = false;
        }
    }

    /// Open or close the grid settings. Opening it closes the other panels.
    pub fn toggle_grid_settings_panel(&mut self) {
        self.show_grid_settings_panel = !self.show_grid_settings_panel;
        if self.show_grid_settings_panel {
            self.show_design_list_panel = false;
            self.show_alignment_popover = false;
        }
    }

    /// The alignment popover only shows while no panel covers the menu bar.
    pub fn set_alignment_popover(&mut self, visible: bool) {
        self.show_alignment_popover =
            visible && !self.show_design_list_panel && !self.show_grid_settings_panel;
    }

    /// Whether a design is decoded and ready to draw.
    #[must_use]
    pub fn has_design(&self) -> bool {
        self.design_url.is_some()
    }
}
