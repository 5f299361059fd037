//! Error types for playback management
//!
//! Session operations themselves never fail. These errors only exist at the
//! edges: talking to a driver task that is gone, or a collaborator call made
//! on behalf of a surface.

use hymn_core::HymnError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The session driver task has shut down
    #[error("Playback session is not running")]
    DriverClosed,

    /// A backend collaborator failed; local state was kept as-is
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] HymnError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
