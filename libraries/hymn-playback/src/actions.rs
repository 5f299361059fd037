//! Collection mutations issued from the player surfaces
//!
//! Local state is updated first and the backend second. When the backend
//! call fails the user gets an error notification and the local change is
//! kept; there is no rollback. This holds for the bound queue and for
//! favorite flags alike.

use crate::{
    driver::SessionHandle,
    error::Result,
    events::Notification,
    types::PlaybackContext,
};
use hymn_core::types::{PlaylistId, Track, TrackId, UserId};
use hymn_core::{FavoritesStore, PlaylistStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Add/remove tracks on playlists, keeping the bound queue in step
pub struct PlaylistActions {
    store: Arc<dyn PlaylistStore>,
    session: SessionHandle,
}

impl PlaylistActions {
    pub fn new(store: Arc<dyn PlaylistStore>, session: SessionHandle) -> Self {
        Self { store, session }
    }

    /// Add a track to a playlist
    ///
    /// If the playlist is the bound context, the track is appended to the
    /// queue before the backend is asked.
    pub async fn add_track(&self, playlist_id: &PlaylistId, track: Track) -> Result<()> {
        let context = PlaybackContext::Playlist(playlist_id.clone());
        self.session.reconcile_addition(context, track.clone())?;

        if let Err(e) = self.store.add_track_to_playlist(playlist_id, &track).await {
            warn!("Failed to add {} to playlist {}: {}", track.id(), playlist_id, e);
            self.session.notify(Notification::error(format!(
                "Could not add \"{}\" to the playlist",
                track.title()
            )))?;
            return Err(e.into());
        }

        info!("Added {} to playlist {}", track.id(), playlist_id);
        self.session
            .notify(Notification::info(format!("Added \"{}\"", track.title())))?;
        Ok(())
    }

    /// Remove a track from a playlist
    ///
    /// A bound queue drops the track immediately. The current track is never
    /// interrupted, even when it is the one removed.
    pub async fn remove_track(&self, playlist_id: &PlaylistId, track_id: &TrackId) -> Result<()> {
        let context = PlaybackContext::Playlist(playlist_id.clone());
        self.session.reconcile_removal(context, track_id.clone())?;

        if let Err(e) = self
            .store
            .remove_track_from_playlist(playlist_id, track_id)
            .await
        {
            warn!(
                "Failed to remove {} from playlist {}: {}",
                track_id, playlist_id, e
            );
            self.session.notify(Notification::error(
                "Could not remove the track from the playlist",
            ))?;
            return Err(e.into());
        }

        info!("Removed {} from playlist {}", track_id, playlist_id);
        Ok(())
    }
}

/// Favorite toggling for the full-screen player
///
/// Keeps its own view of favorite flags. A toggle flips the local flag
/// before the backend is asked and keeps it when the backend call fails.
pub struct FavoriteActions {
    store: Arc<dyn FavoritesStore>,
    session: SessionHandle,
    user_id: Option<UserId>,
    local: RwLock<HashMap<TrackId, bool>>,
}

impl FavoriteActions {
    pub fn new(
        store: Arc<dyn FavoritesStore>,
        session: SessionHandle,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            store,
            session,
            user_id,
            local: RwLock::new(HashMap::new()),
        }
    }

    /// Local favorite flag, asking the backend only for unseen tracks
    pub async fn is_favorite(&self, track_id: &TrackId) -> Result<bool> {
        if let Some(&flag) = self.local.read().await.get(track_id) {
            return Ok(flag);
        }

        match self.store.is_favorite(track_id).await {
            Ok(flag) => {
                self.local.write().await.insert(track_id.clone(), flag);
                Ok(flag)
            }
            Err(e) => {
                warn!("Failed to read favorite {}: {}", track_id, e);
                self.session
                    .notify(Notification::error("Could not load favorites"))?;
                Err(e.into())
            }
        }
    }

    /// Flip the favorite flag of a track, returning the new value
    pub async fn toggle(&self, track: &Track) -> Result<bool> {
        let was_favorite = self.is_favorite(track.id()).await?;
        self.local
            .write()
            .await
            .insert(track.id().clone(), !was_favorite);

        let outcome = if was_favorite {
            self.store
                .remove_favorite(track.id(), self.user_id.as_ref())
                .await
        } else {
            self.store.add_favorite(track, self.user_id.as_ref()).await
        };

        if let Err(e) = outcome {
            warn!("Failed to update favorite {}: {}", track.id(), e);
            self.session
                .notify(Notification::error("Could not update favorites"))?;
            return Err(e.into());
        }

        Ok(!was_favorite)
    }
}
