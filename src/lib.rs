//! Design overlay engine for visual QA of live pages.
//!
//! A reference image (the "design") is drawn on top of a host page so it can
//! be dragged, scaled, zoomed and faded until it lines up with the real
//! markup. Alignment guides (vertical rhythm lines and column grids) can be
//! shown alongside it. The host is responsible only for wiring its input
//! events into [`overlay::engine::OverlayEngine`] and drawing what
//! [`state::ui::UiState`] and the [`guides`] describe.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`db`] | Embedded SQLite database and schema migrations |
//! | [`services`] | Object store: uploaded designs and grid presets |
//! | [`state`] | Durable settings, ephemeral UI state, change notification |
//! | [`overlay`] | Interaction engine and its host-facing collaborators |
//! | [`guides`] | Rhythm and grid guide parameters |
//! | [`session`] | Mount/teardown orchestration across stores and engine |
//! | [`notify`] | Transient error banner funnel |
//! | [`config`] | Environment-driven configuration |
//! | [`consts`] | Shared numeric constants |
//! | [`error`] | Shared error-code trait |

pub mod config;
pub mod consts;
pub mod db;
pub mod error;
pub mod guides;
pub mod notify;
pub mod overlay;
pub mod services;
pub mod session;
pub mod state;
