#![allow(clippy::float_cmp)]

use super::*;
use crate::services::grid_presets::default_preset;

fn preset(width: &str, columns: u32, gutter: &str, outside: bool, position: GridPosition) -> GridPreset {
    GridPreset {
        id: "p1".into(),
        width: width.into(),
        columns,
        gutter_width: gutter.into(),
        gutter_on_outside: outside,
        position,
        created_at: 0,
    }
}

fn shown(active: &str) -> Settings {
    Settings {
        show_grid_system_overlay: true,
        active_grid_system_id: Some(active.into()),
        ..Settings::default()
    }
}

#[test]
fn default_preset_layout() {
    let guide = GridGuide::from_preset(&default_preset(0), "red").unwrap();
    let layout = guide.layout(1440.0);

    assert_eq!(layout.container, Span { left: 150.0, width: 1140.0 });
    assert_eq!(layout.edge_padding_px, 12.0);
    assert_eq!(layout.columns.len(), 12);
    // (1140 - 24 - 11 * 24) / 12
    assert_eq!(layout.columns[0], Span { left: 162.0, width: 71.0 });
    assert_eq!(layout.columns[11].right(), 1440.0 - 150.0 - 12.0);
}

#[test]
fn inside_gutters_touch_container_edges() {
    let guide = GridGuide::from_preset(&preset("400px", 4, "20px", false, GridPosition::Left), "red").unwrap();
    let layout = guide.layout(1000.0);

    assert_eq!(layout.edge_padding_px, 0.0);
    assert_eq!(layout.columns[0].left, 0.0);
    assert_eq!(layout.columns[0].width, 85.0);
    assert_eq!(layout.columns[3].right(), 400.0);
    assert_eq!(guide.edge_padding(), None);
}

#[test]
fn outside_gutter_pads_half_gutter() {
    let guide = GridGuide::from_preset(&preset("400px", 4, "20px", true, GridPosition::Left), "red").unwrap();
    assert_eq!(guide.edge_padding(), Some(CssLength::px(10.0)));
    let layout = guide.layout(1000.0);
    assert_eq!(layout.columns[0].left, 10.0);
    assert_eq!(layout.columns[3].right(), 390.0);
}

#[test]
fn right_position_hugs_viewport_edge() {
    let guide = GridGuide::from_preset(&preset("400px", 2, "0.5rem", false, GridPosition::Right), "red").unwrap();
    let layout = guide.layout(1000.0);
    assert_eq!(layout.container.left, 600.0);
    assert_eq!(layout.gutter_px, 8.0);
    assert_eq!(layout.columns[1].right(), 1000.0);
}

#[test]
fn container_never_exceeds_viewport() {
    let guide = GridGuide::from_preset(&default_preset(0), "red").unwrap();
    let layout = guide.layout(800.0);
    assert_eq!(layout.container, Span { left: 0.0, width: 800.0 });
}

#[test]
fn percent_gutter_is_relative_to_container() {
    let guide = GridGuide::from_preset(&preset("50%", 2, "10%", false, GridPosition::Center), "red").unwrap();
    let layout = guide.layout(1000.0);
    assert_eq!(layout.container, Span { left: 250.0, width: 500.0 });
    assert_eq!(layout.gutter_px, 50.0);
}

#[test]
fn resolve_uses_active_preset_and_color() {
    let p = preset("960px", 12, "20px", true, GridPosition::Center);
    let guide = GridGuide::resolve(&shown("p1"), Some(&p)).unwrap();
    assert_eq!(guide.preset_id, "p1");
    assert_eq!(guide.color, Settings::default().grid_system_color);
}

#[test]
fn hidden_or_dangling_renders_nothing() {
    let p = preset("960px", 12, "20px", true, GridPosition::Center);
    assert_eq!(GridGuide::resolve(&Settings::default(), Some(&p)), None);
    assert_eq!(GridGuide::resolve(&shown("gone"), None), None);
    assert_eq!(GridGuide::resolve(&shown("gone"), Some(&p)), None);

    let mut no_active = shown("p1");
    no_active.active_grid_system_id = None;
    assert_eq!(GridGuide::resolve(&no_active, Some(&p)), None);
}

#[test]
fn malformed_stored_length_renders_nothing() {
    let p = preset("wide", 12, "20px", true, GridPosition::Center);
    assert_eq!(GridGuide::resolve(&shown("p1"), Some(&p)), None);
}
