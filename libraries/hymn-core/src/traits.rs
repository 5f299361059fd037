/// Collaborator traits consumed by the playback core
///
/// These are the narrow contracts to the backend. Implementations live with
/// the application (HTTP clients, in-memory fakes); the playback crate only
/// ever holds them behind `Arc<dyn ...>`.
use crate::error::Result;
use crate::types::{PlaylistId, Track, TrackId, UserId};
use async_trait::async_trait;

/// Play-count recorder
///
/// Best-effort: callers fire and forget, a failure must never affect playback.
#[async_trait]
pub trait PlayRecorder: Send + Sync {
    /// Record that a track started playing
    async fn record_play(&self, track_id: &TrackId, user_id: Option<&UserId>) -> Result<()>;
}

/// Playlist store
///
/// Called by presentation surfaces, never by the session. The session only
/// sees the resulting reconciliation calls.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Append a track to a playlist
    async fn add_track_to_playlist(&self, playlist_id: &PlaylistId, track: &Track) -> Result<()>;

    /// Remove every occurrence of a track from a playlist
    async fn remove_track_from_playlist(
        &self,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()>;

    /// Fetch the tracks of a playlist in playlist order
    async fn get_playlist_tracks(&self, playlist_id: &PlaylistId) -> Result<Vec<Track>>;
}

/// Favorites store
///
/// Entirely independent of playback state.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Check whether a track is marked as favorite
    async fn is_favorite(&self, track_id: &TrackId) -> Result<bool>;

    /// Mark a track as favorite
    async fn add_favorite(&self, track: &Track, user_id: Option<&UserId>) -> Result<()>;

    /// Remove a track from favorites
    async fn remove_favorite(&self, track_id: &TrackId, user_id: Option<&UserId>) -> Result<()>;
}
