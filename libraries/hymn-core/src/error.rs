/// Core error types for Hymnal Player
use crate::types::{PlaylistId, TrackId};
use thiserror::Error;

/// Result type alias using `HymnError`
pub type Result<T> = std::result::Result<T, HymnError>;

/// Core error type for Hymnal Player
///
/// Produced by collaborators (catalog API, playlist and favorites stores,
/// play-count recorder). The playback session never returns these; it turns
/// them into user notifications.
#[derive(Error, Debug)]
pub enum HymnError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),
}

impl HymnError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}
