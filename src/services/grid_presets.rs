//! Grid preset service: named column-grid configurations.
//!
//! DESIGN
//! ======
//! The preset collection is never empty: migrations seed the built-in
//! preset, deletion refuses to remove the last row or the active one, and
//! reset swaps the whole table for a fresh built-in preset inside a single
//! transaction. Listing is oldest-first because the panel shows presets in
//! the order they were added.

#[cfg(test)]
#[path = "grid_presets_test.rs"]
mod grid_presets_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::consts::DEFAULT_GRID_PRESET_ID;
use crate::error::{ErrorCode, now_ms};
use crate::guides::css::CssLength;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("grid preset not found: {0}")]
    NotFound(String),
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("cannot delete the last remaining grid preset")]
    LastPreset,
    #[error("cannot delete the active grid preset: {0}")]
    ActivePreset(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ErrorCode for PresetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PRESET_NOT_FOUND",
            Self::Validation { .. } => "E_VALIDATION",
            Self::LastPreset => "E_LAST_PRESET",
            Self::ActivePreset(_) => "E_ACTIVE_PRESET",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Horizontal placement of the grid container within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl GridPosition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridPosition {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(PresetError::Validation {
                field: "position",
                reason: format!("expected left, center or right, got '{other}'"),
            }),
        }
    }
}

/// A stored column-grid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPreset {
    pub id: String,
    /// Container width as a CSS length, e.g. `1140px`.
    pub width: String,
    pub columns: u32,
    /// Gutter width as a CSS length, e.g. `24px`.
    pub gutter_width: String,
    /// When set, half a gutter is also applied at both container edges.
    pub gutter_on_outside: bool,
    pub position: GridPosition,
    pub created_at: i64,
}

/// Validated fields for a new preset.
///
/// Construct through [`NewGridPreset::parse`] so malformed input never
/// reaches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGridPreset {
    width: String,
    columns: u32,
    gutter_width: String,
    gutter_on_outside: bool,
    position: GridPosition,
}

impl NewGridPreset {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty or malformed length, or a column
    /// count that is not a positive integer.
    pub fn parse(
        width: &str,
        columns: &str,
        gutter_width: &str,
        gutter_on_outside: bool,
        position: GridPosition,
    ) -> Result<Self, PresetError> {
        let width = validate_length("width", width)?;
        let gutter_width = validate_length("gutter width", gutter_width)?;
        let columns = columns.trim();
        let columns = match columns.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(PresetError::Validation {
                    field: "columns",
                    reason: format!("expected a positive integer, got '{columns}'"),
                });
            }
        };
        Ok(Self { width, columns, gutter_width, gutter_on_outside, position })
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }
}

fn validate_length(field: &'static str, raw: &str) -> Result<String, PresetError> {
    CssLength::parse(raw)
        .map(|len| len.to_string())
        .map_err(|e| PresetError::Validation { field, reason: e.to_string() })
}

/// The built-in preset that always exists after a reset.
#[must_use]
pub fn default_preset(created_at: i64) -> GridPreset {
    GridPreset {
        id: DEFAULT_GRID_PRESET_ID.to_string(),
        width: "1140px".to_string(),
        columns: 12,
        gutter_width: "24px".to_string(),
        gutter_on_outside: true,
        position: GridPosition::Center,
        created_at,
    }
}

type PresetRow = (String, String, i64, String, bool, String, i64);

fn from_row((id, width, columns, gutter_width, gutter_on_outside, position, created_at): PresetRow) -> GridPreset {
    GridPreset {
        id,
        width,
        columns: u32::try_from(columns).unwrap_or(1).max(1),
        gutter_width,
        gutter_on_outside,
        position: position.parse().unwrap_or_default(),
        created_at,
    }
}

async fn insert(executor: impl sqlx::SqliteExecutor<'_>, preset: &GridPreset) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO grid_presets (id, width, columns, gutter_width, gutter_on_outside, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&preset.id)
    .bind(&preset.width)
    .bind(i64::from(preset.columns))
    .bind(&preset.gutter_width)
    .bind(preset.gutter_on_outside)
    .bind(preset.position.as_str())
    .bind(preset.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

// =============================================================================
// CREATE
// =============================================================================

/// Append a new preset.
///
/// # Errors
///
/// Returns `Storage` if the insert fails.
pub async fn create_grid_preset(pool: &SqlitePool, fields: &NewGridPreset) -> Result<GridPreset, PresetError> {
    let preset = GridPreset {
        id: Uuid::new_v4().to_string(),
        width: fields.width.clone(),
        columns: fields.columns,
        gutter_width: fields.gutter_width.clone(),
        gutter_on_outside: fields.gutter_on_outside,
        position: fields.position,
        created_at: now_ms(),
    };
    insert(pool, &preset).await?;
    tracing::info!(id = %preset.id, columns = preset.columns, "created grid preset");
    Ok(preset)
}

// =============================================================================
// READ
// =============================================================================

/// Point lookup. `Ok(None)` when the id does not exist.
///
/// # Errors
///
/// Returns `Storage` if the query fails.
pub async fn get_grid_preset(pool: &SqlitePool, id: &str) -> Result<Option<GridPreset>, PresetError> {
    let row = sqlx::query_as::<_, PresetRow>(
        "SELECT id, width, columns, gutter_width, gutter_on_outside, position, created_at
         FROM grid_presets WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(from_row))
}

/// All presets, oldest first.
///
/// # Errors
///
/// Returns `Storage` if the query fails.
pub async fn list_grid_presets(pool: &SqlitePool) -> Result<Vec<GridPreset>, PresetError> {
    let rows = sqlx::query_as::<_, PresetRow>(
        "SELECT id, width, columns, gutter_width, gutter_on_outside, position, created_at
         FROM grid_presets ORDER BY created_at ASC, seq ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(from_row).collect())
}

// =============================================================================
// DELETE / RESET
// =============================================================================

/// Delete a preset that is neither active nor the last one left.
///
/// # Errors
///
/// Returns `ActivePreset` if `id` is the active preset, `LastPreset` if it
/// is the only one, and `NotFound` if it does not exist.
pub async fn delete_grid_preset(pool: &SqlitePool, id: &str, active_id: Option<&str>) -> Result<(), PresetError> {
    if active_id == Some(id) {
        return Err(PresetError::ActivePreset(id.to_string()));
    }

    let mut tx = pool.begin().await?;
    let exists: Option<i64> = sqlx::query_scalar("SELECT seq FROM grid_presets WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(PresetError::NotFound(id.to_string()));
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grid_presets")
        .fetch_one(&mut *tx)
        .await?;
    if count <= 1 {
        return Err(PresetError::LastPreset);
    }
    sqlx::query("DELETE FROM grid_presets WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(%id, "deleted grid preset");
    Ok(())
}

/// Replace every preset with a fresh built-in one, atomically.
///
/// # Errors
///
/// Returns `Storage` if the transaction fails; the old presets are kept.
pub async fn reset_grid_presets(pool: &SqlitePool) -> Result<GridPreset, PresetError> {
    let preset = default_preset(now_ms());
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM grid_presets").execute(&mut *tx).await?;
    insert(&mut *tx, &preset).await?;
    tx.commit().await?;

    tracing::info!("reset grid presets to default");
    Ok(preset)
}
