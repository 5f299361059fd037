//! In-memory hymnal
//!
//! Stands in for the catalog backend: tracks, albums and playlists loaded
//! from a JSON file, plus the collaborator traits the playback core talks to.
//! `set_offline(true)` makes every backend call fail so the failure paths
//! can be tried from the REPL.

use crate::error::Result;
use async_trait::async_trait;
use hymn_core::{
    AlbumId, FavoritesStore, HymnError, PlayRecorder, PlaylistId, PlaylistStore, Track, TrackId,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

const BUNDLED_HYMNAL: &str = include_str!("../data/hymnal.json");

/// Album or playlist as stored in the hymnal file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub track_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HymnalFile {
    tracks: Vec<Track>,
    #[serde(default)]
    albums: Vec<CollectionRecord>,
    #[serde(default)]
    playlists: Vec<CollectionRecord>,
}

#[derive(Debug, Clone)]
struct Playlist {
    title: String,
    track_ids: Vec<TrackId>,
}

/// Summary line for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub id: String,
    pub title: String,
    pub track_count: usize,
}

/// Tracks, albums and playlists held in memory
pub struct Hymnal {
    tracks: Vec<Track>,
    by_id: HashMap<TrackId, usize>,
    albums: Vec<CollectionRecord>,
    playlists: RwLock<HashMap<PlaylistId, Playlist>>,
    playlist_order: Vec<PlaylistId>,
    offline: AtomicBool,
}

impl Hymnal {
    /// Hymnal shipped with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_HYMNAL)
    }

    /// Load a hymnal file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a hymnal from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let file: HymnalFile = serde_json::from_str(json)?;

        let by_id = file
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id().clone(), i))
            .collect::<HashMap<_, _>>();

        let mut playlists = HashMap::new();
        let mut playlist_order = Vec::new();
        for record in file.playlists {
            let id = PlaylistId::new(record.id);
            let track_ids = record
                .track_ids
                .into_iter()
                .map(TrackId::new)
                .filter(|id| {
                    let known = by_id.contains_key(id);
                    if !known {
                        warn!("Playlist references unknown track {}", id);
                    }
                    known
                })
                .collect();
            playlist_order.push(id.clone());
            playlists.insert(
                id,
                Playlist {
                    title: record.title,
                    track_ids,
                },
            );
        }

        info!(
            "Hymnal loaded: {} tracks, {} albums, {} playlists",
            file.tracks.len(),
            file.albums.len(),
            playlist_order.len()
        );

        Ok(Self {
            tracks: file.tracks,
            by_id,
            albums: file.albums,
            playlists: RwLock::new(playlists),
            playlist_order,
            offline: AtomicBool::new(false),
        })
    }

    /// Make every backend call fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    pub fn track(&self, id: &str) -> Option<Track> {
        self.by_id
            .get(&TrackId::new(id))
            .map(|&i| self.tracks[i].clone())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn albums(&self) -> Vec<CollectionSummary> {
        self.albums
            .iter()
            .map(|a| CollectionSummary {
                id: a.id.clone(),
                title: a.title.clone(),
                track_count: a.track_ids.len(),
            })
            .collect()
    }

    pub async fn playlists(&self) -> Vec<CollectionSummary> {
        let playlists = self.playlists.read().await;
        self.playlist_order
            .iter()
            .filter_map(|id| {
                playlists.get(id).map(|p| CollectionSummary {
                    id: id.to_string(),
                    title: p.title.clone(),
                    track_count: p.track_ids.len(),
                })
            })
            .collect()
    }

    /// Tracks of an album in album order
    pub fn album_tracks(&self, album_id: &AlbumId) -> hymn_core::Result<Vec<Track>> {
        let album = self
            .albums
            .iter()
            .find(|a| a.id == album_id.as_str())
            .ok_or_else(|| HymnError::not_found("album", album_id.as_str()))?;

        Ok(album
            .track_ids
            .iter()
            .filter_map(|id| self.track(id))
            .collect())
    }

    fn ensure_online(&self) -> hymn_core::Result<()> {
        if self.is_offline() {
            return Err(HymnError::network("catalog is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for Hymnal {
    async fn add_track_to_playlist(&self, playlist_id: &PlaylistId, track: &Track) -> hymn_core::Result<()> {
        self.ensure_online()?;
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .get_mut(playlist_id)
            .ok_or_else(|| HymnError::PlaylistNotFound(playlist_id.clone()))?;
        playlist.track_ids.push(track.id().clone());
        Ok(())
    }

    async fn remove_track_from_playlist(
        &self,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> hymn_core::Result<()> {
        self.ensure_online()?;
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .get_mut(playlist_id)
            .ok_or_else(|| HymnError::PlaylistNotFound(playlist_id.clone()))?;

        let before = playlist.track_ids.len();
        playlist.track_ids.retain(|id| id != track_id);
        if playlist.track_ids.len() == before {
            return Err(HymnError::TrackNotFound(track_id.clone()));
        }
        Ok(())
    }

    async fn get_playlist_tracks(&self, playlist_id: &PlaylistId) -> hymn_core::Result<Vec<Track>> {
        let playlists = self.playlists.read().await;
        let playlist = playlists
            .get(playlist_id)
            .ok_or_else(|| HymnError::PlaylistNotFound(playlist_id.clone()))?;

        Ok(playlist
            .track_ids
            .iter()
            .filter_map(|id| self.by_id.get(id).map(|&i| self.tracks[i].clone()))
            .collect())
    }
}

/// Favorites kept for the life of the process
pub struct MemoryFavorites {
    hymnal: Arc<Hymnal>,
    ids: RwLock<HashSet<TrackId>>,
}

impl MemoryFavorites {
    /// Favorites share the hymnal's offline switch
    pub fn new(hymnal: Arc<Hymnal>) -> Self {
        Self {
            hymnal,
            ids: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    async fn is_favorite(&self, track_id: &TrackId) -> hymn_core::Result<bool> {
        Ok(self.ids.read().await.contains(track_id))
    }

    async fn add_favorite(&self, track: &Track, _user_id: Option<&UserId>) -> hymn_core::Result<()> {
        self.hymnal.ensure_online()?;
        self.ids.write().await.insert(track.id().clone());
        Ok(())
    }

    async fn remove_favorite(
        &self,
        track_id: &TrackId,
        _user_id: Option<&UserId>,
    ) -> hymn_core::Result<()> {
        self.hymnal.ensure_online()?;
        self.ids.write().await.remove(track_id);
        Ok(())
    }
}

/// Play recorder that logs each play and keeps a count
pub struct LoggingRecorder {
    hymnal: Arc<Hymnal>,
    plays: AtomicU64,
}

impl LoggingRecorder {
    pub fn new(hymnal: Arc<Hymnal>) -> Self {
        Self {
            hymnal,
            plays: AtomicU64::new(0),
        }
    }

    pub fn plays(&self) -> u64 {
        self.plays.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayRecorder for LoggingRecorder {
    async fn record_play(&self, track_id: &TrackId, user_id: Option<&UserId>) -> hymn_core::Result<()> {
        self.hymnal.ensure_online()?;
        let total = self.plays.fetch_add(1, Ordering::SeqCst) + 1;
        match user_id {
            Some(user) => info!("Play recorded: {} by {} (total {})", track_id, user, total),
            None => info!("Play recorded: {} (total {})", track_id, total),
        }
        Ok(())
    }
}
