//! Overlay interaction: input model, gesture engine and host seams.
//!
//! [`engine::OverlayEngine`] is the state machine; everything else here is a
//! collaborator it owns or consumes.

pub mod align;
pub mod display;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod listeners;

#[cfg(test)]
pub(crate) mod testing;
