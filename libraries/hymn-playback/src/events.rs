//! Session events and snapshots
//!
//! Presentation surfaces (mini-player, full-screen player, queue panel) never
//! hold playback state of their own. They re-render from `SessionSnapshot`
//! and react to `SessionEvent`s. Events are emitted at key points:
//! - Track changes (explicit play, next/previous, auto-advance)
//! - Status changes (play/pause/stop)
//! - Queue, context and mode changes
//! - Notifications for collaborator or media failures

use crate::types::{PlaybackContext, PlaybackStatus, RepeatMode};
use hymn_core::types::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Current track changed
    TrackChanged {
        /// ID of the new current track
        track_id: TrackId,
        /// ID of the track that was current before (if any)
        previous_track_id: Option<TrackId>,
        /// Whether the progress clock caused the change
        auto_advanced: bool,
    },

    /// Playback status changed
    StatusChanged { status: PlaybackStatus },

    /// Position moved by a seek or a duration update (clock ticks do not emit)
    PositionChanged { position: f64, duration: f64 },

    /// Volume changed
    VolumeChanged { volume: f64 },

    /// Repeat mode changed
    RepeatChanged { mode: RepeatMode },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// Up-next list changed (tracks added, removed or reordered)
    QueueChanged { length: usize },

    /// Session bound to a different collection
    ContextChanged { context: PlaybackContext },

    /// User-facing transient message
    Notification(Notification),
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for the user (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_track: Option<Track>,
    pub status: PlaybackStatus,
    /// Seconds
    pub position: f64,
    /// Seconds (0 when unknown)
    pub duration: f64,
    pub volume: f64,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    /// Up next, current track excluded
    pub queue: Vec<Track>,
    pub context: PlaybackContext,
}

impl SessionSnapshot {
    /// Position as a fraction of the duration, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}
