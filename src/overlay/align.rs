//! Nine-point alignment compass for snapping the overlay to page edges.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use std::fmt;
use std::str::FromStr;

use crate::overlay::geometry::{Position, Size, round_px};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    TopLeft,
    #[default]
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn offset(self, page: f64, overlay: f64) -> i32 {
        match self {
            Self::Start => 0,
            Self::Middle => round_px((page - overlay) / 2.0),
            Self::End => round_px(page - overlay),
        }
    }
}

impl Alignment {
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    fn anchors(self) -> (Anchor, Anchor) {
        match self {
            Self::TopLeft => (Anchor::Start, Anchor::Start),
            Self::TopCenter => (Anchor::Middle, Anchor::Start),
            Self::TopRight => (Anchor::End, Anchor::Start),
            Self::CenterLeft => (Anchor::Start, Anchor::Middle),
            Self::Center => (Anchor::Middle, Anchor::Middle),
            Self::CenterRight => (Anchor::End, Anchor::Middle),
            Self::BottomLeft => (Anchor::Start, Anchor::End),
            Self::BottomCenter => (Anchor::Middle, Anchor::End),
            Self::BottomRight => (Anchor::End, Anchor::End),
        }
    }

    /// Overlay position that places it at this compass point of the page.
    ///
    /// `page` is the host's scrollable size, `overlay` the overlay's
    /// current on-screen size. An overlay larger than the page gets a
    /// negative offset and overhangs the start edge.
    #[must_use]
    pub fn target(self, page: Size, overlay: Size) -> Position {
        let (horizontal, vertical) = self.anchors();
        Position::new(
            horizontal.offset(page.width, overlay.width),
            vertical.offset(page.height, overlay.height),
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown alignment '{s}'"))
    }
}
