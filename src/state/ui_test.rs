use super::*;

#[test]
fn default_state_is_idle() {
    let ui = UiState::default();
    assert!(!ui.is_dragging);
    assert!(!ui.is_solid_mode);
    assert!(!ui.is_zoom_mode);
    assert!(!ui.enable_animation);
    assert!(!ui.has_design());
    assert!(ui.error_message.is_none());
}

#[test]
fn opening_design_list_closes_grid_settings() {
    let mut ui = UiState::default();
    ui.toggle_grid_settings_panel();
    assert!(ui.show_grid_settings_panel);

    ui.toggle_design_list_panel();
    assert!(ui.show_design_list_panel);
    assert!(!ui.show_grid_settings_panel);
}

#[test]
fn toggling_panel_twice_closes_it() {
    let mut ui = UiState::default();
    ui.toggle_design_list_panel();
    ui.toggle_design_list_panel();
    assert!(!ui.show_design_list_panel);
}

#[test]
fn popover_suppressed_while_panel_open() {
    let mut ui = UiState::default();
    ui.set_alignment_popover(true);
    assert!(ui.show_alignment_popover);

    ui.toggle_grid_settings_panel();
    assert!(!ui.show_alignment_popover);
    ui.set_alignment_popover(true);
    assert!(!ui.show_alignment_popover);
}

#[test]
fn store_updates_are_visible_to_clones() {
    let store = UiStore::new(UiState::default());
    let view = store.clone();
    store.update(|ui| ui.error_message = Some("boom".into()));
    assert_eq!(view.get().error_message.as_deref(), Some("boom"));
}
