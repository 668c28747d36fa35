//! Object store: uploaded design images and grid presets.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the SQL and the invariants of each collection so the
//! session and the CLI can stay focused on orchestration.

pub mod grid_presets;
pub mod images;
