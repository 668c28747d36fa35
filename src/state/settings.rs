//! Durable overlay settings with an observable in-memory mirror.
//!
//! DESIGN
//! ======
//! Every field is its own storage entry (`<prefix><camelCaseKey>`, JSON
//! value), so fields round-trip independently: an unset or unparseable
//! entry reads as the field's default without disturbing its neighbours.
//!
//! `update` writes each field of a patch individually, then merges the
//! written fields into the mirror in one publish. The durable writes are not
//! transactional with each other; if one fails, the fields written before it
//! are still merged so the mirror keeps matching storage.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_GRID_PRESET_ID, OPACITY_DEFAULT, OPACITY_MAX, OPACITY_MIN};
use crate::error::ErrorCode;
use crate::overlay::geometry::Position;
use crate::state::observable::Observable;
use crate::state::storage::{KeyValueStorage, StorageError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Encode(_) => "E_ENCODE",
        }
    }
}

/// The two permitted overlay scale factors. Stored as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesignScale {
    Half,
    #[default]
    Full,
}

impl DesignScale {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Half => Self::Full,
            Self::Full => Self::Half,
        }
    }
}

impl Serialize for DesignScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Half => serializer.serialize_f64(0.5),
            Self::Full => serializer.serialize_u8(1),
        }
    }
}

impl<'de> Deserialize<'de> for DesignScale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if (raw - 0.5).abs() < f64::EPSILON {
            Ok(Self::Half)
        } else if (raw - 1.0).abs() < f64::EPSILON {
            Ok(Self::Full)
        } else {
            Err(serde::de::Error::custom(format!("scale must be 0.5 or 1, got {raw}")))
        }
    }
}

/// Which page edge the menu bar docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppPosition {
    #[default]
    Top,
    Bottom,
}

/// The durable settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub design_id: Option<String>,
    pub design_opacity: f64,
    pub design_position: Position,
    pub design_scale: DesignScale,
    pub lock_design_overlay: bool,
    pub show_design_overlay: bool,
    pub show_vertical_rhythm_overlay: bool,
    pub vertical_rhythm_height: String,
    pub vertical_rhythm_grid_color: String,
    pub show_grid_system_overlay: bool,
    pub active_grid_system_id: Option<String>,
    pub grid_system_color: String,
    pub app_position: AppPosition,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            design_id: None,
            design_opacity: OPACITY_DEFAULT,
            design_position: Position::default(),
            design_scale: DesignScale::Full,
            lock_design_overlay: false,
            show_design_overlay: true,
            show_vertical_rhythm_overlay: false,
            vertical_rhythm_height: "8px".to_string(),
            vertical_rhythm_grid_color: "rgba(255, 0, 0, 0.1)".to_string(),
            show_grid_system_overlay: false,
            active_grid_system_id: Some(DEFAULT_GRID_PRESET_ID.to_string()),
            grid_system_color: "rgba(255, 0, 0, 0.1)".to_string(),
            app_position: AppPosition::Top,
        }
    }
}

/// Storage key of every settings field, in declaration order.
pub const SETTING_KEYS: [&str; 13] = [
    "designId",
    "designOpacity",
    "designPosition",
    "designScale",
    "lockDesignOverlay",
    "showDesignOverlay",
    "showVerticalRhythmOverlay",
    "verticalRhythmHeight",
    "verticalRhythmGridColor",
    "showGridSystemOverlay",
    "activeGridSystemId",
    "gridSystemColor",
    "appPosition",
];

/// A partial settings record; only `Some` fields are written.
///
/// Nullable fields use a nested option: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_scale: Option<DesignScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_design_overlay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_design_overlay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_vertical_rhythm_overlay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_rhythm_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_rhythm_grid_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_grid_system_overlay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_grid_system_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_system_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_position: Option<AppPosition>,
}

impl From<Settings> for SettingsPatch {
    fn from(s: Settings) -> Self {
        Self {
            design_id: Some(s.design_id),
            design_opacity: Some(s.design_opacity),
            design_position: Some(s.design_position),
            design_scale: Some(s.design_scale),
            lock_design_overlay: Some(s.lock_design_overlay),
            show_design_overlay: Some(s.show_design_overlay),
            show_vertical_rhythm_overlay: Some(s.show_vertical_rhythm_overlay),
            vertical_rhythm_height: Some(s.vertical_rhythm_height),
            vertical_rhythm_grid_color: Some(s.vertical_rhythm_grid_color),
            show_grid_system_overlay: Some(s.show_grid_system_overlay),
            active_grid_system_id: Some(s.active_grid_system_id),
            grid_system_color: Some(s.grid_system_color),
            app_position: Some(s.app_position),
        }
    }
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Clamp values that parse but fall outside their permitted range.
fn sanitize(mut settings: Settings) -> Settings {
    if !settings.design_opacity.is_finite() {
        settings.design_opacity = OPACITY_DEFAULT;
    }
    settings.design_opacity = settings.design_opacity.clamp(OPACITY_MIN, OPACITY_MAX);
    settings
}

// =============================================================================
// STORE
// =============================================================================

/// Field-level durable settings with an observable mirror.
pub struct SettingsStore {
    storage: Box<dyn KeyValueStorage>,
    prefix: String,
    mirror: Observable<Settings>,
}

impl SettingsStore {
    /// Load every field from `storage`, falling back to defaults per field.
    pub fn load(storage: Box<dyn KeyValueStorage>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let settings = read_all(storage.as_ref(), &prefix);
        Self { storage, prefix, mirror: Observable::new(settings) }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.mirror.get()
    }

    /// Read a single field without cloning the record.
    pub fn with<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        self.mirror.with(f)
    }

    /// JSON value of one field by storage key; `None` for unknown keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let Ok(object) = self.mirror.with(|s| to_object(s)) else {
            return None;
        };
        object.get(key).cloned()
    }

    /// Receiver notified after every merged update.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Settings> {
        self.mirror.subscribe()
    }

    /// Persist each field of `patch`, then merge them into the mirror at once.
    ///
    /// The merged record is decoded before anything is written, so a patch
    /// that would not read back (a NaN opacity encodes as `null`) is rejected
    /// with nothing stored.
    ///
    /// # Errors
    ///
    /// Returns `Encode` for a patch that does not form a valid record, or the
    /// first storage failure. Fields written before a storage failure are
    /// kept and merged; the failing field and any after it are not.
    pub fn update(&self, patch: SettingsPatch) -> Result<(), SettingsError> {
        let fields = to_object(&patch)?;
        if fields.is_empty() {
            return Ok(());
        }

        let current = self.mirror.with(|s| to_object(s))?;
        let mut candidate = current.clone();
        candidate.extend(fields.clone());
        serde_json::from_value::<Settings>(Value::Object(candidate))?;

        let mut written = Map::new();
        let mut failure = None;
        for (key, value) in fields {
            match self.storage.set_item(&self.storage_key(&key), &value.to_string()) {
                Ok(()) => {
                    written.insert(key, value);
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "settings write failed");
                    failure = Some(e);
                    break;
                }
            }
        }

        if !written.is_empty() {
            let mut merged = current;
            merged.extend(written);
            let next: Settings = serde_json::from_value(Value::Object(merged))?;
            self.mirror.replace(next);
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Restore every field to its default, in storage and in memory.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure, as for [`SettingsStore::update`].
    pub fn reset(&self) -> Result<(), SettingsError> {
        self.update(SettingsPatch::from(Settings::default()))
    }
}

fn read_all(storage: &dyn KeyValueStorage, prefix: &str) -> Settings {
    let defaults = Settings::default();
    let Ok(mut merged) = to_object(&defaults) else {
        return defaults;
    };

    for key in SETTING_KEYS {
        let raw = match storage.get_item(&format!("{prefix}{key}")) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(%key, error = %e, "settings read failed; using default");
                continue;
            }
        };
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            tracing::warn!(%key, "unparseable setting; using default");
            continue;
        };

        // Accept the stored value only if it decodes in place of the default.
        let mut candidate = merged.clone();
        candidate.insert(key.to_string(), value);
        if serde_json::from_value::<Settings>(Value::Object(candidate.clone())).is_ok() {
            merged = candidate;
        } else {
            tracing::warn!(%key, "setting has wrong shape; using default");
        }
    }

    serde_json::from_value(Value::Object(merged)).map_or(defaults, sanitize)
}
