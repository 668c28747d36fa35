#![allow(clippy::float_cmp)]

use super::*;
use crate::db;
use crate::overlay::geometry::{Point, Position};
use crate::overlay::input::{Button, PointerEvent};
use crate::overlay::testing::{RecordingHost, png};
use crate::services::grid_presets::GridPosition;
use crate::state::storage::{KeyValueStorage, MemoryStorage};

// =============================================================================
// helpers
// =============================================================================

struct Fixture {
    host: Rc<RecordingHost>,
    storage: MemoryStorage,
    session: Session<RecordingHost>,
}

async fn fixture_on(storage: MemoryStorage, pool: SqlitePool) -> Fixture {
    let host = Rc::new(RecordingHost::new());
    let settings = SettingsStore::load(Box::new(storage.clone()), "_PM-");
    let mut session = Session::new(pool, settings, Rc::clone(&host));
    session.mount().await.unwrap();
    Fixture { host, storage, session }
}

async fn fixture() -> Fixture {
    let pool = db::init_memory_pool().await.unwrap();
    fixture_on(MemoryStorage::new(), pool).await
}

fn upload(name: &str, w: u32, h: u32) -> UploadFile {
    UploadFile::new(name, png(w, h))
}

fn selected(f: &Fixture) -> Option<String> {
    f.session.settings().with(|s| s.design_id.clone())
}

fn active_preset(f: &Fixture) -> Option<String> {
    f.session.settings().with(|s| s.active_grid_system_id.clone())
}

fn banner(f: &Fixture) -> Option<String> {
    f.session.ui().with(|ui| ui.error_message.clone())
}

// =============================================================================
// uploads + selection
// =============================================================================

#[tokio::test]
async fn upload_selects_newest_and_shows_overlay() {
    let mut f = fixture().await;
    f.session.settings().update(SettingsPatch { show_design_overlay: Some(false), ..Default::default() }).unwrap();

    let stored = f.session.upload(vec![upload("design.png", 40, 30)]).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(selected(&f).as_deref(), Some(stored[0].id.as_str()));
    assert!(f.session.settings().with(|s| s.show_design_overlay));
    assert!(f.session.ui().with(UiState::has_design));
    assert_eq!(f.host.live_urls(), 1);
    assert!(f.session.drain_actions().contains(&Action::RenderNeeded));
}

#[tokio::test]
async fn upload_filters_unaccepted_files() {
    let mut f = fixture().await;
    let stored = f.session.upload(vec![UploadFile::new("notes.txt", vec![1, 2])]).await.unwrap();
    assert!(stored.is_empty());
    assert_eq!(selected(&f), None);
    assert!(images::list_images(f.session.pool()).await.unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_upload_is_deselected_and_reported() {
    let mut f = fixture().await;
    let err = f.session.upload(vec![UploadFile::new("broken.jpg", vec![0; 16])]).await.unwrap_err();
    assert_eq!(err.error_code(), "E_DESIGN_DECODE");
    assert_eq!(selected(&f), None);
    assert_eq!(f.host.live_urls(), 0);
    assert!(banner(&f).is_some());
}

#[tokio::test]
async fn selecting_another_design_releases_previous_url() {
    let mut f = fixture().await;
    let stored = f.session.upload(vec![upload("a.png", 10, 10), upload("b.png", 20, 20)]).await.unwrap();
    let older = stored[1].id.clone();

    f.session.select_image(&older).await.unwrap();
    assert_eq!(selected(&f), Some(older));
    assert_eq!(f.host.live_urls(), 1);
    assert_eq!(f.host.revoked().len(), 1);
}

#[tokio::test]
async fn selecting_unknown_design_reports_not_found() {
    let mut f = fixture().await;
    let err = f.session.select_image("missing").await.unwrap_err();
    assert_eq!(err.error_code(), "E_IMAGE_NOT_FOUND");
    assert_eq!(banner(&f).as_deref(), Some("design not found: missing"));

    f.session.dismiss_error();
    assert_eq!(banner(&f), None);
}

#[tokio::test]
async fn deleting_selected_design_clears_selection() {
    let mut f = fixture().await;
    let stored = f.session.upload(vec![upload("a.png", 10, 10)]).await.unwrap();
    f.session.delete_image(&stored[0].id).await.unwrap();

    assert_eq!(selected(&f), None);
    assert_eq!(f.host.live_urls(), 0);
    assert!(!f.session.ui().with(UiState::has_design));
}

#[tokio::test]
async fn deleting_other_design_keeps_selection() {
    let mut f = fixture().await;
    let stored = f.session.upload(vec![upload("a.png", 10, 10), upload("b.png", 10, 10)]).await.unwrap();
    let (newest, older) = (stored[0].id.clone(), stored[1].id.clone());

    f.session.delete_image(&older).await.unwrap();
    assert_eq!(selected(&f), Some(newest));
    assert_eq!(f.host.live_urls(), 1);
}

#[tokio::test]
async fn delete_all_releases_display_url() {
    let mut f = fixture().await;
    f.session.upload(vec![upload("a.png", 10, 10), upload("b.png", 10, 10)]).await.unwrap();

    assert_eq!(f.session.delete_all_images().await.unwrap(), 2);
    assert_eq!(f.host.live_urls(), 0);
    assert_eq!(selected(&f), None);
}

// =============================================================================
// mount / reload
// =============================================================================

#[tokio::test]
async fn reload_restores_selected_design_and_position() {
    let pool = db::init_memory_pool().await.unwrap();
    let storage = MemoryStorage::new();
    let mut first = fixture_on(storage.clone(), pool.clone()).await;
    let stored = first.session.upload(vec![upload("a.png", 64, 48)]).await.unwrap();
    first
        .session
        .settings()
        .update(SettingsPatch { design_position: Some(Position::new(7, 9)), ..Default::default() })
        .unwrap();
    first.session.teardown();
    assert_eq!(first.host.live_urls(), 0);

    let second = fixture_on(storage, pool).await;
    assert_eq!(selected(&second), Some(stored[0].id.clone()));
    let ui = second.session.ui().get();
    assert_eq!(ui.design_cached_position, Position::new(7, 9));
    assert_eq!(ui.design_original_size.width, 64.0);
    assert_eq!(second.host.live_urls(), 1);
}

#[tokio::test]
async fn dangling_selection_is_cleared_on_mount() {
    let pool = db::init_memory_pool().await.unwrap();
    let storage = MemoryStorage::new();
    storage.set_item("_PM-designId", "\"gone\"").unwrap();

    let host = Rc::new(RecordingHost::new());
    let settings = SettingsStore::load(Box::new(storage.clone()), "_PM-");
    let mut session = Session::new(pool, settings, host);
    let err = session.mount().await.unwrap_err();

    assert_eq!(err.error_code(), "E_IMAGE_NOT_FOUND");
    assert_eq!(session.settings().with(|s| s.design_id.clone()), None);
    assert_eq!(storage.get_item("_PM-designId").unwrap().as_deref(), Some("null"));
}

#[tokio::test]
async fn teardown_returns_listener_detaches() {
    let mut f = fixture().await;
    let actions = f.session.teardown();
    assert!(actions.iter().any(|a| matches!(a, Action::DetachListener(_))));
    assert!(f.session.engine().listeners().is_empty());
}

// =============================================================================
// presets
// =============================================================================

#[tokio::test]
async fn deleting_active_preset_is_rejected() {
    let mut f = fixture().await;
    let err = f.session.delete_preset(DEFAULT_GRID_PRESET_ID).await.unwrap_err();
    assert_eq!(err.error_code(), "E_ACTIVE_PRESET");
    assert!(banner(&f).is_some());
    assert_eq!(f.session.list_presets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_inactive_preset_succeeds() {
    let mut f = fixture().await;
    let fields = NewGridPreset::parse("960px", "16", "20px", false, GridPosition::Left).unwrap();
    let created = f.session.create_preset(&fields).await.unwrap();

    f.session.delete_preset(&created.id).await.unwrap();
    let ids: Vec<String> = f.session.list_presets().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![DEFAULT_GRID_PRESET_ID.to_string()]);
}

#[tokio::test]
async fn activate_requires_existing_preset() {
    let mut f = fixture().await;
    let err = f.session.activate_preset("nope").await.unwrap_err();
    assert_eq!(err.error_code(), "E_PRESET_NOT_FOUND");
    assert_eq!(active_preset(&f).as_deref(), Some(DEFAULT_GRID_PRESET_ID));
}

#[tokio::test]
async fn reset_presets_reactivates_default() {
    let mut f = fixture().await;
    let fields = NewGridPreset::parse("960px", "16", "20px", false, GridPosition::Left).unwrap();
    let created = f.session.create_preset(&fields).await.unwrap();
    f.session.activate_preset(&created.id).await.unwrap();

    let preset = f.session.reset_presets().await.unwrap();
    assert_eq!(preset.id, DEFAULT_GRID_PRESET_ID);
    assert_eq!(active_preset(&f).as_deref(), Some(DEFAULT_GRID_PRESET_ID));
    let all = f.session.list_presets().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, DEFAULT_GRID_PRESET_ID);
}

// =============================================================================
// guides
// =============================================================================

#[tokio::test]
async fn grid_guide_follows_active_preset() {
    let mut f = fixture().await;
    assert_eq!(f.session.grid_guide().await, None);

    f.session.engine_mut().toggle_grid_guide();
    let guide = f.session.grid_guide().await.unwrap();
    assert_eq!(guide.preset_id, DEFAULT_GRID_PRESET_ID);
    assert_eq!(guide.columns, 12);

    let fields = NewGridPreset::parse("960px", "16", "20px", false, GridPosition::Left).unwrap();
    let created = f.session.create_preset(&fields).await.unwrap();
    f.session.activate_preset(&created.id).await.unwrap();
    let guide = f.session.grid_guide().await.unwrap();
    assert_eq!(guide.preset_id, created.id);
    assert_eq!(guide.columns, 16);
}

#[tokio::test]
async fn dangling_active_preset_renders_nothing() {
    let mut f = fixture().await;
    f.session.engine_mut().toggle_grid_guide();
    f.session
        .settings()
        .update(SettingsPatch { active_grid_system_id: Some(Some("gone".into())), ..Default::default() })
        .unwrap();

    assert_eq!(f.session.grid_guide().await, None);
    assert_eq!(banner(&f), None);
}

#[tokio::test]
async fn rhythm_height_scenario() {
    let mut f = fixture().await;
    f.session.engine_mut().toggle_rhythm_guide();
    f.session.set_rhythm_height("8px").unwrap();
    f.session.set_rhythm_color("rgba(255,0,0,.05)").unwrap();

    let ctx = crate::guides::css::LengthContext::for_viewport(1440.0);
    let guide = f.session.rhythm_guide().unwrap();
    assert_eq!(guide.period_px(&ctx), 8.0);
    assert_eq!(guide.color, "rgba(255,0,0,.05)");

    f.session.set_rhythm_height("16px").unwrap();
    assert_eq!(f.session.rhythm_guide().unwrap().period_px(&ctx), 16.0);
}

#[tokio::test]
async fn invalid_rhythm_height_is_rejected_before_storage() {
    let mut f = fixture().await;
    let writes = f.storage.write_count();
    let err = f.session.set_rhythm_height("big").unwrap_err();
    assert_eq!(err.error_code(), "E_VALIDATION");
    assert_eq!(f.storage.write_count(), writes);
    assert_eq!(f.session.settings().with(|s| s.vertical_rhythm_height.clone()), "8px");
}

#[tokio::test]
async fn failed_color_write_requests_no_render() {
    let mut f = fixture().await;
    f.session.drain_actions();
    f.storage.set_quota(Some(f.storage.len()));

    assert!(f.session.set_rhythm_color("blue").is_err());
    assert!(f.session.set_grid_color("green").is_err());
    assert!(f.session.drain_actions().is_empty());
    assert!(banner(&f).is_some());

    f.storage.set_quota(None);
    f.session.set_grid_color("green").unwrap();
    assert_eq!(f.session.drain_actions(), vec![Action::RenderNeeded]);
}

// =============================================================================
// settings + panels
// =============================================================================

#[tokio::test]
async fn reset_settings_clears_overlay() {
    let mut f = fixture().await;
    f.session.upload(vec![upload("a.png", 10, 10)]).await.unwrap();
    f.session.set_grid_color("blue").unwrap();

    f.session.reset_settings().unwrap();
    assert_eq!(selected(&f), None);
    assert_eq!(f.session.settings().with(|s| s.grid_system_color.clone()), "rgba(255, 0, 0, 0.1)");
    assert_eq!(f.host.live_urls(), 0);
}

#[tokio::test]
async fn panels_are_mutually_exclusive() {
    let f = fixture().await;
    f.session.set_alignment_popover(true);
    f.session.toggle_design_list_panel();
    f.session.toggle_grid_settings_panel();

    let ui = f.session.ui().get();
    assert!(ui.show_grid_settings_panel);
    assert!(!ui.show_design_list_panel);
    assert!(!ui.show_alignment_popover);
}

// =============================================================================
// end-to-end
// =============================================================================

#[tokio::test]
async fn upload_lock_then_drag_scenario() {
    let mut f = fixture().await;
    let stored = f.session.upload(vec![upload("design.png", 200, 100)]).await.unwrap();
    assert_eq!(selected(&f), Some(stored[0].id.clone()));
    assert!(f.session.settings().with(|s| s.show_design_overlay));

    let down = PointerEvent::at(Point::new(50.0, 50.0), Button::Primary);
    let up = PointerEvent::at(Point::new(60.0, 45.0), Button::Primary);
    let start = f.session.settings().with(|s| s.design_position);

    let engine = f.session.engine_mut();
    engine.toggle_lock();
    engine.on_pointer_down(down);
    engine.on_pointer_move(PointerEvent::moved(Point::new(10.0, -5.0)));
    engine.on_pointer_up(up);
    assert_eq!(engine.settings().with(|s| s.design_position), start);

    engine.toggle_lock();
    engine.on_pointer_down(down);
    engine.on_pointer_move(PointerEvent::moved(Point::new(10.0, -5.0)));
    engine.on_pointer_up(up);
    assert_eq!(engine.settings().with(|s| s.design_position), start.offset(10, -5));
}
