//! Overlay state: durable settings, ephemeral UI state, and the storage and
//! change-notification plumbing beneath them.

pub mod observable;
pub mod settings;
pub mod storage;
pub mod ui;
