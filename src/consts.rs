//! Shared numeric constants for the overlay.

// ── Opacity ─────────────────────────────────────────────────────

/// Lowest opacity the overlay may be faded to.
pub const OPACITY_MIN: f64 = 0.1;

/// Highest opacity the overlay may be raised to.
pub const OPACITY_MAX: f64 = 0.9;

/// Opacity change applied per wheel notch while Control is held.
pub const OPACITY_WHEEL_STEP: f64 = 0.05;

/// Opacity used when nothing has been stored yet.
pub const OPACITY_DEFAULT: f64 = 0.5;

// ── Interaction ─────────────────────────────────────────────────

/// Magnification applied when entering zoom mode.
pub const ZOOM_FACTOR: f64 = 2.0;

/// Logical pixels moved per arrow key press.
pub const NUDGE_PX: i32 = 1;

// ── Storage ─────────────────────────────────────────────────────

/// Prefix for every settings key, keeping them apart from host-page keys.
pub const DEFAULT_KEY_PREFIX: &str = "_PM-";

/// Reserved id of the built-in grid preset.
pub const DEFAULT_GRID_PRESET_ID: &str = "default";
