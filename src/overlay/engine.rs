//! Overlay interaction engine.
//!
//! DESIGN
//! ======
//! Input is translated into three orthogonal gesture flags kept in
//! [`UiState`]: `is_dragging`, `is_solid_mode` and `is_zoom_mode`. While a
//! gesture runs, only the live `design_cached_position` moves; the durable
//! [`Settings`](crate::state::settings::Settings) position is written once, when the gesture finishes
//! (pointer-up, arrow key-up, alignment). Key repeat and pointer streams
//! therefore never turn into a stream of storage writes.
//!
//! Global listeners are modelled by [`InputSubscriptions`]. Every handler
//! reports the attach/detach it performed as an [`Action`] so the host can
//! mirror it onto real event targets, and [`OverlayEngine::teardown`] returns
//! a detach for everything still live.
//!
//! ZOOM
//! ====
//! Pointer-down in solid mode magnifies the overlay 2x around the point under
//! the cursor. The inverse pointer-follow listener is only attached once the
//! host reports the size/position transition has ended, so live tracking
//! never fights the entry animation. Exiting zoom restores the base size and
//! the last committed position, which makes enter/exit without movement an
//! exact round trip.
//!
//! ERROR HANDLING
//! ==============
//! Settings commits can fail (quota, I/O). Handlers never return errors:
//! failures go to the [`Notifier`] banner and the live state stays as the
//! user left it.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use crate::consts::{OPACITY_DEFAULT, OPACITY_MAX, OPACITY_MIN, OPACITY_WHEEL_STEP, ZOOM_FACTOR};
use crate::error::ErrorCode;
use crate::notify::Notifier;
use crate::overlay::align::Alignment;
use crate::overlay::display::{DisplayError, HostPage, LoadedDesign, load_design};
use crate::overlay::geometry::{Point, Position, Size, SubpixelTracker, round_px};
use crate::overlay::input::{Button, Key, KeyEvent, PointerEvent, WheelDelta};
use crate::overlay::listeners::{InputSubscriptions, Listener};
use crate::services::images::StoredImage;
use crate::state::settings::{AppPosition, SettingsPatch, SettingsStore};
use crate::state::ui::{UiState, UiStore};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Suppress the browser's default handling of the triggering event.
    PreventDefault,
    AttachListener(Listener),
    DetachListener(Listener),
    RenderNeeded,
}

/// A design failed to load; the overlay was cleared.
///
/// Carries the actions produced while clearing so the host can still
/// detach anything the cleared gestures held.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ShowDesignError {
    #[source]
    pub error: DisplayError,
    pub actions: Vec<Action>,
}

impl ErrorCode for ShowDesignError {
    fn error_code(&self) -> &'static str {
        self.error.error_code()
    }
}

/// Round to two decimals and clamp into the permitted opacity range.
///
/// Non-finite input has no meaningful position in the range and maps to the
/// default opacity.
#[must_use]
pub fn normalize_opacity(value: f64) -> f64 {
    if !value.is_finite() {
        return OPACITY_DEFAULT;
    }
    ((value * 100.0).round() / 100.0).clamp(OPACITY_MIN, OPACITY_MAX)
}

pub struct OverlayEngine<H: HostPage> {
    host: Rc<H>,
    settings: Rc<SettingsStore>,
    ui: UiStore,
    notifier: Notifier,
    listeners: InputSubscriptions,
    design: Option<LoadedDesign<H>>,
    /// Zoom was entered and the follow listener waits for transition end.
    zoom_follow_pending: bool,
    /// Sub-pixel carry for drag and zoom-follow tracking.
    tracker: SubpixelTracker,
}

impl<H: HostPage> OverlayEngine<H> {
    pub fn new(host: Rc<H>, settings: Rc<SettingsStore>, ui: UiStore) -> Self {
        let notifier = Notifier::new(ui.clone());
        Self {
            host,
            settings,
            ui,
            notifier,
            listeners: InputSubscriptions::new(),
            design: None,
            zoom_follow_pending: false,
            tracker: SubpixelTracker::default(),
        }
    }

    // --- Lifecycle ---

    /// Attach the window key listeners and seed the live position.
    pub fn mount(&mut self) -> Vec<Action> {
        let committed = self.settings.with(|s| s.design_position);
        self.ui.update(|ui| ui.design_cached_position = committed);

        let mut actions = Vec::new();
        self.attach(Listener::KeyDown, &mut actions);
        self.attach(Listener::KeyUp, &mut actions);
        actions
    }

    /// Detach every live listener, cancel gestures and release the design.
    pub fn teardown(&mut self) -> Vec<Action> {
        let mut actions = self.clear_design();
        self.ui.update(|ui| {
            ui.is_solid_mode = false;
            ui.enable_animation = false;
        });
        actions.extend(self.listeners.detach_all().into_iter().map(Action::DetachListener));
        tracing::debug!("overlay torn down");
        actions
    }

    // --- Design ---

    /// Allocate and decode `image`, replacing whatever is on screen.
    ///
    /// # Errors
    ///
    /// Returns [`ShowDesignError`] if the image cannot be decoded. The overlay
    /// is left empty and no display URL stays allocated.
    pub fn show_design(&mut self, image: &StoredImage) -> Result<Vec<Action>, ShowDesignError> {
        let loaded = match load_design(&self.host, image) {
            Ok(loaded) => loaded,
            Err(error) => {
                tracing::warn!(image_id = %image.id, %error, "design failed to load");
                let mut actions = self.clear_design();
                actions.push(Action::RenderNeeded);
                return Err(ShowDesignError { error, actions });
            }
        };

        let mut actions = self.cancel_gestures();
        let natural = loaded.natural_size;
        let url = loaded.url().to_string();
        tracing::info!(image_id = %loaded.image_id, width = natural.width, height = natural.height, "design shown");
        self.design = Some(loaded);

        let (factor, committed) = self.settings.with(|s| (s.design_scale.factor(), s.design_position));
        self.ui.update(|ui| {
            ui.design_url = Some(url);
            ui.design_original_size = natural;
            ui.design_size = natural.scaled(factor);
            ui.design_cached_position = committed;
        });
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Remove the design from screen and release its display URL.
    pub fn clear_design(&mut self) -> Vec<Action> {
        let actions = self.cancel_gestures();
        if let Some(previous) = self.design.take() {
            tracing::debug!(image_id = %previous.image_id, "design cleared");
        }
        self.ui.update_if(|ui| {
            let had = ui.design_url.is_some();
            ui.design_url = None;
            ui.design_size = Size::default();
            ui.design_original_size = Size::default();
            had
        });
        actions
    }

    /// Id of the design currently on screen.
    #[must_use]
    pub fn displayed_design_id(&self) -> Option<&str> {
        self.design.as_ref().map(|d| d.image_id.as_str())
    }

    // --- Queries ---

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    #[must_use]
    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    #[must_use]
    pub fn listeners(&self) -> &InputSubscriptions {
        &self.listeners
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Opacity to draw the overlay at; solid mode forces it opaque.
    #[must_use]
    pub fn effective_opacity(&self) -> f64 {
        if self.ui.with(|ui| ui.is_solid_mode) {
            1.0
        } else {
            self.settings.with(|s| s.design_opacity)
        }
    }

    /// Height of the full-page overlay container.
    #[must_use]
    pub fn container_height(&self) -> f64 {
        self.host.document_size().height
    }

    // --- Input events ---

    /// Primary-button press on the overlay image.
    pub fn on_pointer_down(&mut self, event: PointerEvent) -> Vec<Action> {
        if event.button != Button::Primary || !self.is_interactive() {
            return Vec::new();
        }

        let ui = self.ui.get();
        if ui.is_solid_mode {
            return if ui.is_zoom_mode { self.exit_zoom() } else { self.enter_zoom(&ui, event.page) };
        }

        if self.settings.with(|s| s.lock_design_overlay) {
            tracing::debug!("drag ignored: overlay locked");
            return Vec::new();
        }

        let mut actions = Vec::new();
        self.tracker.reset();
        self.ui.update(|ui| ui.is_dragging = true);
        self.attach(Listener::DragMove, &mut actions);
        actions
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) -> Vec<Action> {
        let ui = self.ui.get();
        let delta = if ui.is_dragging && self.listeners.is_attached(Listener::DragMove) {
            event.movement
        } else if ui.is_zoom_mode && ui.is_solid_mode && self.listeners.is_attached(Listener::ZoomFollow) {
            Point::new(-event.movement.x, -event.movement.y)
        } else {
            return Vec::new();
        };
        let next = self.tracker.advance(ui.design_cached_position, delta);

        if self.ui.update_if(|ui| set_if_changed(&mut ui.design_cached_position, next)) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Release ends a drag and commits where it ended.
    pub fn on_pointer_up(&mut self, event: PointerEvent) -> Vec<Action> {
        if event.button != Button::Primary || !self.ui.with(|ui| ui.is_dragging) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        let position = self.ui.with(|ui| ui.design_cached_position);
        self.ui.update(|ui| ui.is_dragging = false);
        self.detach(Listener::DragMove, &mut actions);
        self.commit(
            "commit drag",
            SettingsPatch { design_position: Some(position), ..Default::default() },
        );
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Wheel with Control held steps the overlay opacity.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if !self.listeners.is_attached(Listener::OpacityWheel) {
            return Vec::new();
        }

        let mut actions = vec![Action::PreventDefault];
        let step = if delta.dy < 0.0 {
            OPACITY_WHEEL_STEP
        } else if delta.dy > 0.0 {
            -OPACITY_WHEEL_STEP
        } else {
            return actions;
        };

        let current = self.settings.with(|s| s.design_opacity);
        let next = normalize_opacity(current + step);
        if (next - current).abs() > f64::EPSILON {
            self.commit("commit opacity", SettingsPatch { design_opacity: Some(next), ..Default::default() });
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_key_down(&mut self, event: &KeyEvent) -> Vec<Action> {
        if event.target.is_form_control() {
            return Vec::new();
        }

        let mut actions = Vec::new();
        match &event.key {
            Key::Control => self.attach(Listener::OpacityWheel, &mut actions),
            Key::Space => {
                actions.push(Action::PreventDefault);
                let entered = self.ui.update_if(|ui| {
                    if ui.is_dragging || ui.is_solid_mode {
                        return false;
                    }
                    ui.is_solid_mode = true;
                    true
                });
                if entered {
                    tracing::debug!("solid mode on");
                    actions.push(Action::RenderNeeded);
                }
            }
            Key::Escape => {
                actions.extend(self.toggle_lock());
            }
            key => {
                let Some((dx, dy)) = key.nudge() else {
                    return actions;
                };
                if !self.is_interactive() || self.ui.with(|ui| ui.is_zoom_mode) {
                    return actions;
                }
                actions.push(Action::PreventDefault);
                self.ui.update(|ui| ui.design_cached_position = ui.design_cached_position.offset(dx, dy));
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// Releases of Control and Space always end their mode, even inside a
    /// form control, since focus may have moved there while the key was held.
    pub fn on_key_up(&mut self, event: &KeyEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        match &event.key {
            Key::Control => self.detach(Listener::OpacityWheel, &mut actions),
            Key::Space => {
                if self.ui.with(|ui| ui.is_zoom_mode) {
                    actions.extend(self.exit_zoom());
                }
                if self.ui.update_if(|ui| std::mem::replace(&mut ui.is_solid_mode, false)) {
                    tracing::debug!("solid mode off");
                    actions.push(Action::RenderNeeded);
                }
            }
            key => {
                if event.target.is_form_control()
                    || key.nudge().is_none()
                    || !self.is_interactive()
                    || self.ui.with(|ui| ui.is_zoom_mode)
                {
                    return actions;
                }
                let position = self.ui.with(|ui| ui.design_cached_position);
                if position != self.settings.with(|s| s.design_position) {
                    self.commit(
                        "commit nudge",
                        SettingsPatch { design_position: Some(position), ..Default::default() },
                    );
                }
            }
        }
        actions
    }

    /// The host finished animating a size or position change.
    pub fn on_transition_end(&mut self) -> Vec<Action> {
        self.ui.update_if(|ui| std::mem::replace(&mut ui.enable_animation, false));

        let mut actions = Vec::new();
        if self.zoom_follow_pending {
            self.zoom_follow_pending = false;
            if self.ui.with(|ui| ui.is_zoom_mode) {
                self.tracker.reset();
                self.attach(Listener::ZoomFollow, &mut actions);
            }
        }
        actions
    }

    // --- Commands ---

    /// Snap the overlay to a compass point of the page.
    ///
    /// A zoomed overlay is brought back to base size first so the target is
    /// computed for the size that gets committed.
    pub fn align(&mut self, alignment: Alignment) -> Vec<Action> {
        if !self.ui.with(UiState::has_design) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.ui.with(|ui| ui.is_zoom_mode) {
            actions.extend(self.exit_zoom());
        }

        let overlay = self.ui.with(|ui| ui.design_size);
        let target = alignment.target(self.host.document_size(), overlay);
        if target == self.settings.with(|s| s.design_position) {
            tracing::debug!(%alignment, "alignment unchanged");
            return actions;
        }

        self.ui.update(|ui| {
            ui.design_cached_position = target;
            ui.enable_animation = true;
        });
        self.commit("commit alignment", SettingsPatch { design_position: Some(target), ..Default::default() });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Flip between half and full scale.
    pub fn toggle_scale(&mut self) -> Vec<Action> {
        let scale = self.settings.with(|s| s.design_scale.toggled());
        let mut actions = Vec::new();
        if self.ui.with(|ui| ui.is_zoom_mode) {
            actions.extend(self.exit_zoom());
        }
        self.ui.update(|ui| {
            ui.design_size = ui.design_original_size.scaled(scale.factor());
            ui.enable_animation = true;
        });
        self.commit("commit scale", SettingsPatch { design_scale: Some(scale), ..Default::default() });
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn toggle_lock(&mut self) -> Vec<Action> {
        let locked = !self.settings.with(|s| s.lock_design_overlay);
        tracing::debug!(locked, "lock toggled");
        self.commit("toggle lock", SettingsPatch { lock_design_overlay: Some(locked), ..Default::default() });
        vec![Action::RenderNeeded]
    }

    pub fn toggle_visibility(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gestures();
        let visible = !self.settings.with(|s| s.show_design_overlay);
        self.commit("toggle overlay", SettingsPatch { show_design_overlay: Some(visible), ..Default::default() });
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Vec<Action> {
        if !opacity.is_finite() {
            tracing::warn!(opacity, "ignoring non-finite opacity");
            return Vec::new();
        }
        let next = normalize_opacity(opacity);
        self.commit("set opacity", SettingsPatch { design_opacity: Some(next), ..Default::default() });
        vec![Action::RenderNeeded]
    }

    pub fn toggle_rhythm_guide(&mut self) -> Vec<Action> {
        let visible = !self.settings.with(|s| s.show_vertical_rhythm_overlay);
        self.commit(
            "toggle rhythm guide",
            SettingsPatch { show_vertical_rhythm_overlay: Some(visible), ..Default::default() },
        );
        vec![Action::RenderNeeded]
    }

    pub fn toggle_grid_guide(&mut self) -> Vec<Action> {
        let visible = !self.settings.with(|s| s.show_grid_system_overlay);
        self.commit(
            "toggle grid guide",
            SettingsPatch { show_grid_system_overlay: Some(visible), ..Default::default() },
        );
        vec![Action::RenderNeeded]
    }

    pub fn set_app_position(&mut self, position: AppPosition) -> Vec<Action> {
        self.commit("move menu", SettingsPatch { app_position: Some(position), ..Default::default() });
        vec![Action::RenderNeeded]
    }

    // --- Internals ---

    /// A design is on screen and visible.
    fn is_interactive(&self) -> bool {
        self.design.is_some() && self.settings.with(|s| s.show_design_overlay)
    }

    fn enter_zoom(&mut self, ui: &UiState, cursor: Point) -> Vec<Action> {
        let center = self.host.viewport().center();
        let old = ui.design_cached_position.to_point();
        let next = Position::new(
            round_px(center.x - (cursor.x - old.x) * ZOOM_FACTOR),
            round_px(center.y - (cursor.y - old.y) * ZOOM_FACTOR),
        );
        tracing::debug!(x = next.x, y = next.y, "zoom in");

        self.ui.update(|ui| {
            ui.is_zoom_mode = true;
            ui.design_size = ui.design_size.scaled(ZOOM_FACTOR);
            ui.design_cached_position = next;
            ui.enable_animation = true;
        });
        self.zoom_follow_pending = true;
        vec![Action::RenderNeeded]
    }

    fn exit_zoom(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.zoom_follow_pending = false;
        self.detach(Listener::ZoomFollow, &mut actions);

        let (factor, committed) = self.settings.with(|s| (s.design_scale.factor(), s.design_position));
        tracing::debug!("zoom out");
        self.ui.update(|ui| {
            ui.is_zoom_mode = false;
            ui.design_size = ui.design_original_size.scaled(factor);
            ui.design_cached_position = committed;
            ui.enable_animation = true;
        });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Drop any drag or zoom in progress without committing it.
    fn cancel_gestures(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.with(|ui| ui.is_zoom_mode) {
            actions.extend(self.exit_zoom());
        }
        self.zoom_follow_pending = false;
        self.tracker.reset();
        self.detach(Listener::DragMove, &mut actions);
        self.detach(Listener::ZoomFollow, &mut actions);
        self.ui.update_if(|ui| std::mem::replace(&mut ui.is_dragging, false));
        actions
    }

    fn attach(&mut self, listener: Listener, actions: &mut Vec<Action>) {
        if self.listeners.attach(listener) {
            actions.push(Action::AttachListener(listener));
        }
    }

    fn detach(&mut self, listener: Listener, actions: &mut Vec<Action>) {
        if self.listeners.detach(listener) {
            actions.push(Action::DetachListener(listener));
        }
    }

    fn commit(&self, operation: &str, patch: SettingsPatch) {
        if let Err(e) = self.settings.update(patch) {
            self.notifier.report(operation, &e);
        }
    }
}

impl<H: HostPage> Drop for OverlayEngine<H> {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            let live: Vec<Listener> = self.listeners.detach_all();
            tracing::warn!(?live, "engine dropped without teardown");
        }
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
