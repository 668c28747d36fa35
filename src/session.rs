//! Overlay session: one mounted overlay wired to its stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host page creates a [`Session`] on load, forwards raw input to
//! [`Session::engine_mut`], and calls the async operations here for anything
//! that touches the object store (uploads, selection, presets). Each
//! operation keeps the three stores consistent:
//!
//! - the selected design id in settings always names a design that is
//!   either on screen or being loaded; a dangling id is cleared, never
//!   retried;
//! - the active preset id only ever moves to a preset that exists;
//! - every failure is logged and shown on the banner before it is returned.
//!
//! Engine actions produced by session operations (render requests,
//! listener detaches when a gesture is cancelled) queue up until the host
//! calls [`Session::drain_actions`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use sqlx::SqlitePool;

use crate::consts::DEFAULT_GRID_PRESET_ID;
use crate::error::ErrorCode;
use crate::guides::css::{CssLength, CssLengthError};
use crate::guides::grid::GridGuide;
use crate::guides::rhythm::RhythmGuide;
use crate::notify::Notifier;
use crate::overlay::display::HostPage;
use crate::overlay::engine::{Action, OverlayEngine, ShowDesignError};
use crate::services::grid_presets::{self, GridPreset, NewGridPreset, PresetError};
use crate::services::images::{self, ImageError, StoredImage, UploadFile};
use crate::state::settings::{SettingsError, SettingsPatch, SettingsStore};
use crate::state::ui::{UiState, UiStore};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Display(#[from] ShowDesignError),
    #[error("invalid length: {0}")]
    Length(#[from] CssLengthError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Image(e) => e.error_code(),
            Self::Preset(e) => e.error_code(),
            Self::Settings(e) => e.error_code(),
            Self::Display(e) => e.error_code(),
            Self::Length(_) => "E_VALIDATION",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Image(e) => e.retryable(),
            Self::Preset(e) => e.retryable(),
            Self::Settings(e) => e.retryable(),
            Self::Display(_) | Self::Length(_) => false,
        }
    }
}

/// Active preset as last fetched, keyed by the id it was fetched for.
struct CachedPreset {
    id: String,
    preset: Option<GridPreset>,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session<H: HostPage> {
    pool: SqlitePool,
    settings: Rc<SettingsStore>,
    ui: UiStore,
    notifier: Notifier,
    engine: OverlayEngine<H>,
    grid_cache: Option<CachedPreset>,
    actions: Vec<Action>,
}

impl<H: HostPage> Session<H> {
    pub fn new(pool: SqlitePool, settings: SettingsStore, host: Rc<H>) -> Self {
        let settings = Rc::new(settings);
        let ui = UiStore::new(UiState::default());
        let notifier = Notifier::new(ui.clone());
        let engine = OverlayEngine::new(host, Rc::clone(&settings), ui.clone());
        Self { pool, settings, ui, notifier, engine, grid_cache: None, actions: Vec::new() }
    }

    // --- Accessors ---

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    #[must_use]
    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    #[must_use]
    pub fn engine(&self) -> &OverlayEngine<H> {
        &self.engine
    }

    /// Engine handle for forwarding host input events.
    pub fn engine_mut(&mut self) -> &mut OverlayEngine<H> {
        &mut self.engine
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Take the engine actions queued by session operations.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    // --- Lifecycle ---

    /// Mount the engine and restore the selected design, if any.
    ///
    /// # Errors
    ///
    /// Returns the error that prevented the selected design from showing.
    /// The selection has been cleared by then.
    pub async fn mount(&mut self) -> Result<(), SessionError> {
        let mounted = self.engine.mount();
        self.actions.extend(mounted);

        let Some(id) = self.settings.with(|s| s.design_id.clone()) else {
            return Ok(());
        };
        let result = self.restore_design(&id).await;
        self.reported("restore design", result)
    }

    async fn restore_design(&mut self, id: &str) -> Result<(), SessionError> {
        match images::get_image(&self.pool, id).await? {
            Some(image) => self.display(&image),
            None => {
                tracing::warn!(design_id = id, "selected design no longer exists");
                self.forget_design()?;
                Err(ImageError::NotFound(id.to_string()).into())
            }
        }
    }

    /// Release everything the session holds on the host.
    pub fn teardown(&mut self) -> Vec<Action> {
        let mut actions = self.drain_actions();
        actions.extend(self.engine.teardown());
        actions
    }

    // --- Designs ---

    /// Store the accepted files and show the newest one.
    ///
    /// Files without an accepted image extension are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be stored (nothing is kept)
    /// or the newest design could not be shown.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Result<Vec<StoredImage>, SessionError> {
        let result = self.try_upload(files).await;
        self.reported("upload designs", result)
    }

    async fn try_upload(&mut self, files: Vec<UploadFile>) -> Result<Vec<StoredImage>, SessionError> {
        let accepted = images::filter_accepted(files);
        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        let stored = images::upload_images(&self.pool, accepted).await?;
        if let Some(newest) = stored.first() {
            self.display(newest)?;
            self.settings.update(SettingsPatch { show_design_overlay: Some(true), ..Default::default() })?;
        }
        Ok(stored)
    }

    /// Show a stored design and remember it as the selection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or the decode failure.
    pub async fn select_image(&mut self, id: &str) -> Result<(), SessionError> {
        let result = self.try_select(id).await;
        self.reported("select design", result)
    }

    async fn try_select(&mut self, id: &str) -> Result<(), SessionError> {
        let image = images::get_image(&self.pool, id)
            .await?
            .ok_or_else(|| ImageError::NotFound(id.to_string()))?;
        self.display(&image)
    }

    /// Delete one design; deselects it if it was selected.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or a storage failure.
    pub async fn delete_image(&mut self, id: &str) -> Result<(), SessionError> {
        let result = self.try_delete_image(id).await;
        self.reported("delete design", result)
    }

    async fn try_delete_image(&mut self, id: &str) -> Result<(), SessionError> {
        images::delete_image(&self.pool, id).await?;
        let selected = self.settings.with(|s| s.design_id.as_deref() == Some(id));
        if selected || self.engine.displayed_design_id() == Some(id) {
            self.forget_design()?;
        }
        Ok(())
    }

    /// Delete every design and release the display URL.
    ///
    /// # Errors
    ///
    /// Returns a storage failure; the overlay is untouched in that case.
    pub async fn delete_all_images(&mut self) -> Result<u64, SessionError> {
        let result = self.try_delete_all().await;
        self.reported("delete all designs", result)
    }

    async fn try_delete_all(&mut self) -> Result<u64, SessionError> {
        let removed = images::delete_all_images(&self.pool).await?;
        self.forget_design()?;
        Ok(removed)
    }

    /// Put `image` on screen and select it; a decode failure deselects.
    fn display(&mut self, image: &StoredImage) -> Result<(), SessionError> {
        match self.engine.show_design(image) {
            Ok(actions) => {
                self.actions.extend(actions);
                self.settings.update(SettingsPatch { design_id: Some(Some(image.id.clone())), ..Default::default() })?;
                Ok(())
            }
            Err(mut e) => {
                self.actions.append(&mut e.actions);
                self.settings.update(SettingsPatch { design_id: Some(None), ..Default::default() })?;
                Err(e.into())
            }
        }
    }

    fn forget_design(&mut self) -> Result<(), SessionError> {
        let cleared = self.engine.clear_design();
        self.actions.extend(cleared);
        self.actions.push(Action::RenderNeeded);
        self.settings.update(SettingsPatch { design_id: Some(None), ..Default::default() })?;
        Ok(())
    }

    // --- Grid presets ---

    /// # Errors
    ///
    /// Returns a storage failure.
    pub async fn list_presets(&self) -> Result<Vec<GridPreset>, SessionError> {
        let result = grid_presets::list_grid_presets(&self.pool).await.map_err(SessionError::from);
        self.reported("list grid presets", result)
    }

    /// # Errors
    ///
    /// Returns a storage failure.
    pub async fn create_preset(&mut self, fields: &NewGridPreset) -> Result<GridPreset, SessionError> {
        let result = grid_presets::create_grid_preset(&self.pool, fields).await.map_err(SessionError::from);
        self.reported("create grid preset", result)
    }

    /// Delete a preset that is neither active nor the last one.
    ///
    /// # Errors
    ///
    /// Returns `ActivePreset`, `LastPreset`, `NotFound` or a storage failure.
    pub async fn delete_preset(&mut self, id: &str) -> Result<(), SessionError> {
        let active = self.settings.with(|s| s.active_grid_system_id.clone());
        let result = grid_presets::delete_grid_preset(&self.pool, id, active.as_deref())
            .await
            .map_err(SessionError::from);
        if result.is_ok() {
            self.invalidate_grid(id);
        }
        self.reported("delete grid preset", result)
    }

    /// Make an existing preset the active one.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a storage failure.
    pub async fn activate_preset(&mut self, id: &str) -> Result<(), SessionError> {
        let result = self.try_activate(id).await;
        self.reported("activate grid preset", result)
    }

    async fn try_activate(&mut self, id: &str) -> Result<(), SessionError> {
        let preset = grid_presets::get_grid_preset(&self.pool, id)
            .await?
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
        self.settings.update(SettingsPatch {
            active_grid_system_id: Some(Some(preset.id.clone())),
            ..Default::default()
        })?;
        self.grid_cache = Some(CachedPreset { id: preset.id.clone(), preset: Some(preset) });
        self.actions.push(Action::RenderNeeded);
        Ok(())
    }

    /// Replace all presets with the built-in default and activate it.
    ///
    /// # Errors
    ///
    /// Returns a storage failure; presets are unchanged in that case.
    pub async fn reset_presets(&mut self) -> Result<GridPreset, SessionError> {
        let result = self.try_reset_presets().await;
        self.reported("reset grid presets", result)
    }

    async fn try_reset_presets(&mut self) -> Result<GridPreset, SessionError> {
        let preset = grid_presets::reset_grid_presets(&self.pool).await?;
        self.grid_cache = None;
        self.settings.update(SettingsPatch {
            active_grid_system_id: Some(Some(DEFAULT_GRID_PRESET_ID.to_string())),
            ..Default::default()
        })?;
        self.actions.push(Action::RenderNeeded);
        Ok(preset)
    }

    fn invalidate_grid(&mut self, id: &str) {
        if self.grid_cache.as_ref().is_some_and(|c| c.id == id) {
            self.grid_cache = None;
        }
    }

    // --- Guides ---

    #[must_use]
    pub fn rhythm_guide(&self) -> Option<RhythmGuide> {
        self.settings.with(RhythmGuide::from_settings)
    }

    /// Resolve the grid guide, refetching the preset when the active id
    /// changed since the last call.
    pub async fn grid_guide(&mut self) -> Option<GridGuide> {
        let settings = self.settings.snapshot();
        if !settings.show_grid_system_overlay {
            return None;
        }
        let active = settings.active_grid_system_id.clone()?;

        let stale = self.grid_cache.as_ref().is_none_or(|c| c.id != active);
        if stale {
            match grid_presets::get_grid_preset(&self.pool, &active).await {
                Ok(preset) => self.grid_cache = Some(CachedPreset { id: active, preset }),
                Err(e) => {
                    self.notifier.report("load grid preset", &e);
                    return None;
                }
            }
        }

        let preset = self.grid_cache.as_ref().and_then(|c| c.preset.as_ref());
        GridGuide::resolve(&settings, preset)
    }

    /// Set the rhythm row height from user input.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed length; nothing is stored.
    pub fn set_rhythm_height(&mut self, raw: &str) -> Result<(), SessionError> {
        let result = CssLength::parse(raw).map_err(SessionError::from).and_then(|height| {
            self.settings
                .update(SettingsPatch { vertical_rhythm_height: Some(height.to_string()), ..Default::default() })
                .map_err(SessionError::from)
        });
        if result.is_ok() {
            self.actions.push(Action::RenderNeeded);
        }
        self.reported("set rhythm height", result)
    }

    /// # Errors
    ///
    /// Returns a settings storage failure.
    pub fn set_rhythm_color(&mut self, color: &str) -> Result<(), SessionError> {
        let result = self
            .settings
            .update(SettingsPatch { vertical_rhythm_grid_color: Some(color.to_string()), ..Default::default() })
            .map_err(SessionError::from);
        if result.is_ok() {
            self.actions.push(Action::RenderNeeded);
        }
        self.reported("set rhythm color", result)
    }

    /// # Errors
    ///
    /// Returns a settings storage failure.
    pub fn set_grid_color(&mut self, color: &str) -> Result<(), SessionError> {
        let result = self
            .settings
            .update(SettingsPatch { grid_system_color: Some(color.to_string()), ..Default::default() })
            .map_err(SessionError::from);
        if result.is_ok() {
            self.actions.push(Action::RenderNeeded);
        }
        self.reported("set grid color", result)
    }

    // --- Settings ---

    /// Restore every setting to its default; the overlay is cleared.
    ///
    /// # Errors
    ///
    /// Returns the first settings storage failure.
    pub fn reset_settings(&mut self) -> Result<(), SessionError> {
        let result = self.settings.reset().map_err(SessionError::from);
        let cleared = self.engine.clear_design();
        self.actions.extend(cleared);
        let committed = self.settings.with(|s| s.design_position);
        self.ui.update(|ui| ui.design_cached_position = committed);
        self.grid_cache = None;
        self.actions.push(Action::RenderNeeded);
        self.reported("reset settings", result)
    }

    // --- Panels & banner ---

    pub fn toggle_design_list_panel(&self) {
        self.ui.update(UiState::toggle_design_list_panel);
    }

    pub fn toggle_grid_settings_panel(&self) {
        self.ui.update(UiState::toggle_grid_settings_panel);
    }

    pub fn set_alignment_popover(&self, visible: bool) {
        self.ui.update(|ui| ui.set_alignment_popover(visible));
    }

    /// Dismiss the banner (outside click).
    pub fn dismiss_error(&self) {
        self.notifier.dismiss();
    }

    fn reported<T>(&self, operation: &str, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            self.notifier.report(operation, e);
        }
        result
    }
}
