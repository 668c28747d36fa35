//! Vertical rhythm guide.
//!
//! A 1px line at the top of every row, repeated down the full page. The
//! host paints [`RhythmGuide::background_image`] onto the overlay container;
//! [`RhythmGuide::line_offsets`] gives the same lines as numbers.

#[cfg(test)]
#[path = "rhythm_test.rs"]
mod rhythm_test;

use crate::guides::css::{CssLength, LengthContext};
use crate::state::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmGuide {
    pub row_height: CssLength,
    pub color: String,
}

impl RhythmGuide {
    /// Resolve from settings; `None` if hidden or the row height is invalid.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.show_vertical_rhythm_overlay {
            return None;
        }
        match CssLength::parse(&settings.vertical_rhythm_height) {
            Ok(row_height) => Some(Self { row_height, color: settings.vertical_rhythm_grid_color.clone() }),
            Err(e) => {
                tracing::warn!(height = %settings.vertical_rhythm_height, error = %e, "rhythm guide skipped");
                None
            }
        }
    }

    /// Band period in pixels.
    #[must_use]
    pub fn period_px(&self, ctx: &LengthContext) -> f64 {
        self.row_height.resolve_px(ctx)
    }

    /// CSS `background-image` drawing one line per row.
    #[must_use]
    pub fn background_image(&self) -> String {
        format!(
            "repeating-linear-gradient(to bottom, {c} 0, {c} 1px, transparent 1px, transparent {h})",
            c = self.color,
            h = self.row_height,
        )
    }

    /// Y offsets of every line within `height_px`.
    pub fn line_offsets(&self, height_px: f64, ctx: &LengthContext) -> impl Iterator<Item = f64> {
        let period = self.period_px(ctx);
        let count = if period > 0.0 { (height_px / period).ceil() } else { 0.0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = count.max(0.0) as u64;
        (0..count).map(move |i| {
            #[allow(clippy::cast_precision_loss)]
            let i = i as f64;
            i * period
        })
    }
}
