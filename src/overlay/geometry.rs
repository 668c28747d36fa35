#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A pointer coordinate or movement delta in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Overlay position in whole logical pixels, anchored at the page's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }

    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Accumulates fractional pointer deltas into whole-pixel moves.
///
/// The carried remainder stays within half a pixel, so after any run of
/// deltas the position is the rounded sum of everything fed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubpixelTracker {
    remainder: Point,
}

impl SubpixelTracker {
    /// Move `from` by `delta`, carrying the sub-pixel part forward.
    pub fn advance(&mut self, from: Position, delta: Point) -> Position {
        let x = self.remainder.x + delta.x;
        let y = self.remainder.y + delta.y;
        let (dx, dy) = (round_px(x), round_px(y));
        self.remainder = Point::new(x - f64::from(dx), y - f64::from(dy));
        from.offset(dx, dy)
    }

    pub fn reset(&mut self) {
        self.remainder = Point::default();
    }
}

/// Round to the nearest whole pixel, saturating at the `i32` range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_px(value: f64) -> i32 {
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self { width: self.width * factor, height: self.height * factor }
    }
}

/// The visible part of the page: scroll offset plus window size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Center of the window in page coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.scroll_x + self.width / 2.0, self.scroll_y + self.height / 2.0)
    }
}
