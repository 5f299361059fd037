//! Hymnal Player - terminal front end
//!
//! Wires the playback session to an in-memory hymnal and renders the
//! mini-player, full-screen player and queue panel as text.

pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod repl;
pub mod surfaces;

pub use error::{PlayerError, Result};
