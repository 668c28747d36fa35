//! Input model: pointer buttons, keys, wheel deltas and event targets.
//!
//! These are the host-neutral shapes of the DOM events the engine consumes.
//! The host translates its native events into them and forwards them to
//! [`crate::overlay::engine::OverlayEngine`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::NUDGE_PX;
use crate::overlay::geometry::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
    /// Back, forward or any other extra button, by DOM index.
    Other(i16),
}

impl Button {
    /// Map the DOM `MouseEvent.button` index.
    #[must_use]
    pub fn from_dom(index: i16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// A keyboard key the overlay reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Control,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Any other key, by its browser name.
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(name: &str) -> Self {
        match name {
            "Control" => Self::Control,
            " " | "Spacebar" | "Space" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            other => Self::Other(other.to_string()),
        }
    }

    /// Pixel offset an arrow key nudges the overlay by.
    #[must_use]
    pub fn nudge(&self) -> Option<(i32, i32)> {
        match self {
            Self::ArrowUp => Some((0, -NUDGE_PX)),
            Self::ArrowDown => Some((0, NUDGE_PX)),
            Self::ArrowLeft => Some((-NUDGE_PX, 0)),
            Self::ArrowRight => Some((NUDGE_PX, 0)),
            _ => None,
        }
    }
}

/// The element a keyboard event was dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    #[default]
    Page,
    TextInput,
    Select,
}

impl KeyTarget {
    /// Form controls swallow keys so typing never triggers gestures.
    #[must_use]
    pub fn is_form_control(self) -> bool {
        matches!(self, Self::TextInput | Self::Select)
    }
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub target: KeyTarget,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self { key, target: KeyTarget::Page }
    }

    #[must_use]
    pub fn on(key: Key, target: KeyTarget) -> Self {
        Self { key, target }
    }
}

/// A pointer event on the overlay or the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer location in page coordinates.
    pub page: Point,
    /// Movement since the previous pointer event.
    pub movement: Point,
    pub button: Button,
}

impl PointerEvent {
    #[must_use]
    pub fn at(page: Point, button: Button) -> Self {
        Self { page, movement: Point::default(), button }
    }

    #[must_use]
    pub fn moved(movement: Point) -> Self {
        Self { page: Point::default(), movement, button: Button::Primary }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}
