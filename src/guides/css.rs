//! CSS length values used by guide and preset settings.
//!
//! Lengths are kept in their authored unit so the renderer can hand them to
//! the page verbatim; [`CssLength::resolve_px`] converts them to pixels when
//! a layout needs concrete numbers.

#[cfg(test)]
#[path = "css_test.rs"]
mod css_test;

use std::fmt;
use std::str::FromStr;

/// Supported length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssUnit {
    Px,
    Rem,
    Em,
    Percent,
    Vw,
}

impl CssUnit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Rem => "rem",
            Self::Em => "em",
            Self::Percent => "%",
            Self::Vw => "vw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssLengthError {
    #[error("length is empty")]
    Empty,
    #[error("unsupported unit in '{0}'")]
    Unit(String),
    #[error("invalid number in '{0}'")]
    Number(String),
    #[error("length must be positive: '{0}'")]
    NotPositive(String),
}

/// A positive CSS length such as `24px`, `1.5rem` or `100%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    pub value: f64,
    pub unit: CssUnit,
}

/// Reference sizes needed to turn relative units into pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Width that `%` is relative to.
    pub container_px: f64,
    /// Viewport width, for `vw`.
    pub viewport_px: f64,
    /// Root font size, for `rem` and `em`.
    pub font_px: f64,
}

impl LengthContext {
    #[must_use]
    pub fn for_viewport(viewport_px: f64) -> Self {
        Self { container_px: viewport_px, viewport_px, font_px: 16.0 }
    }
}

impl CssLength {
    #[must_use]
    pub fn px(value: f64) -> Self {
        Self { value, unit: CssUnit::Px }
    }

    /// Parse an authored length. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, unknown units, malformed numbers,
    /// and zero or negative values.
    pub fn parse(raw: &str) -> Result<Self, CssLengthError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CssLengthError::Empty);
        }

        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| CssLengthError::Unit(trimmed.to_string()))?;
        let (number, unit) = trimmed.split_at(split);

        let unit = match unit.to_ascii_lowercase().as_str() {
            "px" => CssUnit::Px,
            "rem" => CssUnit::Rem,
            "em" => CssUnit::Em,
            "%" => CssUnit::Percent,
            "vw" => CssUnit::Vw,
            _ => return Err(CssLengthError::Unit(trimmed.to_string())),
        };
        let value: f64 = number
            .parse()
            .map_err(|_| CssLengthError::Number(trimmed.to_string()))?;
        if value <= 0.0 || !value.is_finite() {
            return Err(CssLengthError::NotPositive(trimmed.to_string()));
        }

        Ok(Self { value, unit })
    }

    /// Length in CSS pixels.
    #[must_use]
    pub fn resolve_px(&self, ctx: &LengthContext) -> f64 {
        match self.unit {
            CssUnit::Px => self.value,
            CssUnit::Rem | CssUnit::Em => self.value * ctx.font_px,
            CssUnit::Percent => self.value * ctx.container_px / 100.0,
            CssUnit::Vw => self.value * ctx.viewport_px / 100.0,
        }
    }

    /// Half of this length, same unit.
    #[must_use]
    pub fn half(&self) -> Self {
        Self { value: self.value / 2.0, unit: self.unit }
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_str())
    }
}

impl FromStr for CssLength {
    type Err = CssLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
