//! Core types for the playback session

use hymn_core::types::{AlbumId, PlaylistId, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback status
///
/// `Stopped` holds exactly when there is no current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No track loaded
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

impl PlaybackStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Repeat mode
///
/// Only ever moves along the cycle `Off -> All -> One -> Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    #[serde(alias = "none")]
    Off,

    /// Reload the queue from the start when it ends
    All,

    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the repeat cycle
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string ("none" is accepted for `Off`)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" | "none" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection the current queue was derived from
///
/// Used only to decide whether an external collection mutation applies to
/// this session. It never influences ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PlaybackContext {
    /// Ad-hoc queue, no backing collection
    #[default]
    None,

    /// Tracks of an album
    Album(AlbumId),

    /// Tracks of a playlist
    Playlist(PlaylistId),
}

impl PlaybackContext {
    /// Whether a collection is bound
    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Configuration for the playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial volume in [0, 1] (default: 0.8)
    pub volume: f64,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Clock tick interval (default: 1s)
    pub tick_interval: Duration,

    /// Fraction of the duration at which auto-advance may fire early (default: 0.995)
    pub near_completion: f64,

    /// Seed for shuffle draws; `None` seeds from entropy
    pub shuffle_seed: Option<u64>,

    /// User passed to the play-count recorder
    pub user_id: Option<UserId>,

    /// Capacity of the driver's event broadcast channel (default: 64)
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume: 0.8,
            repeat: RepeatMode::Off,
            shuffle: false,
            tick_interval: Duration::from_secs(1),
            near_completion: 0.995,
            shuffle_seed: None,
            user_id: None,
            event_capacity: 64,
        }
    }
}
