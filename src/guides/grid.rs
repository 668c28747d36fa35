//! Column grid guide.
//!
//! DESIGN
//! ======
//! The active preset describes a container (width, horizontal position) and
//! N equal columns separated by gutters. With `gutter_on_outside` the
//! container also gets half a gutter of padding on each edge, so the outer
//! columns sit a full gutter apart from neighbouring containers.
//!
//! [`GridGuide::layout`] resolves the preset to concrete pixel spans for a
//! given viewport width; the container never grows beyond the viewport.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::guides::css::{CssLength, CssLengthError, LengthContext};
use crate::services::grid_presets::{GridPosition, GridPreset};
use crate::state::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct GridGuide {
    pub preset_id: String,
    pub container_width: CssLength,
    pub columns: u32,
    pub gutter: CssLength,
    pub gutter_on_outside: bool,
    pub position: GridPosition,
    pub color: String,
}

/// A horizontal span in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f64,
    pub width: f64,
}

impl Span {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub container: Span,
    /// Padding applied at each container edge.
    pub edge_padding_px: f64,
    pub gutter_px: f64,
    pub columns: Vec<Span>,
}

impl GridGuide {
    /// Build from a stored preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored width or gutter is not a valid length.
    pub fn from_preset(preset: &GridPreset, color: impl Into<String>) -> Result<Self, CssLengthError> {
        Ok(Self {
            preset_id: preset.id.clone(),
            container_width: CssLength::parse(&preset.width)?,
            columns: preset.columns.max(1),
            gutter: CssLength::parse(&preset.gutter_width)?,
            gutter_on_outside: preset.gutter_on_outside,
            position: preset.position,
            color: color.into(),
        })
    }

    /// Resolve the guide for the current settings.
    ///
    /// `preset` is whatever the active id resolved to. A hidden guide, a
    /// dangling id, a preset that is not the active one, or a malformed
    /// stored length all yield `None`.
    #[must_use]
    pub fn resolve(settings: &Settings, preset: Option<&GridPreset>) -> Option<Self> {
        if !settings.show_grid_system_overlay {
            return None;
        }
        let active_id = settings.active_grid_system_id.as_deref()?;
        let Some(preset) = preset.filter(|p| p.id == active_id) else {
            tracing::warn!(preset_id = active_id, "active grid preset not found");
            return None;
        };
        match Self::from_preset(preset, settings.grid_system_color.clone()) {
            Ok(guide) => Some(guide),
            Err(e) => {
                tracing::warn!(preset_id = %preset.id, error = %e, "grid guide skipped");
                None
            }
        }
    }

    /// Padding the renderer applies at each container edge, if any.
    #[must_use]
    pub fn edge_padding(&self) -> Option<CssLength> {
        self.gutter_on_outside.then(|| self.gutter.half())
    }

    /// Concrete column spans for a viewport `viewport_px` wide.
    #[must_use]
    pub fn layout(&self, viewport_px: f64) -> GridLayout {
        let ctx = LengthContext::for_viewport(viewport_px);
        let width = self.container_width.resolve_px(&ctx).min(viewport_px).max(0.0);
        let left = match self.position {
            GridPosition::Left => 0.0,
            GridPosition::Center => (viewport_px - width) / 2.0,
            GridPosition::Right => viewport_px - width,
        };

        let inner_ctx = LengthContext { container_px: width, ..ctx };
        let gutter = self.gutter.resolve_px(&inner_ctx);
        let padding = if self.gutter_on_outside { gutter / 2.0 } else { 0.0 };

        let n = f64::from(self.columns);
        let inner = (width - 2.0 * padding).max(0.0);
        let column_width = ((inner - gutter * (n - 1.0)) / n).max(0.0);

        let columns = (0..self.columns)
            .map(|i| Span { left: left + padding + f64::from(i) * (column_width + gutter), width: column_width })
            .collect();

        GridLayout { container: Span { left, width }, edge_padding_px: padding, gutter_px: gutter, columns }
    }
}
