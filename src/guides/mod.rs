//! Guide renderers: vertical rhythm lines and column grids.
//!
//! Both are pure functions of settings (and, for the grid, the active
//! preset). They return `None` when the guide is hidden or its inputs do not
//! resolve, so the host simply draws nothing.

pub mod css;
pub mod grid;
pub mod rhythm;
