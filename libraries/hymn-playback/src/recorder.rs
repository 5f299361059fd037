//! Play-count notification
//!
//! `Session::play` calls a `PlayNotifier` synchronously. The notifier that
//! talks to the backend spawns the actual `record_play` call on the tokio
//! runtime and drops the result; a failure is logged and surfaced as a
//! notification event, and never reaches the session.

use crate::events::{Notification, SessionEvent};
use hymn_core::types::{Track, UserId};
use hymn_core::PlayRecorder;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Fire-and-forget hook invoked when a track starts
pub trait PlayNotifier: Send {
    fn notify_play(&self, track: &Track);
}

/// Notifier that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl PlayNotifier for NoopNotifier {
    fn notify_play(&self, _track: &Track) {}
}

/// Notifier backed by a `PlayRecorder` collaborator
pub struct RecorderNotifier {
    recorder: Arc<dyn PlayRecorder>,
    user_id: Option<UserId>,
    events: broadcast::Sender<SessionEvent>,
}

impl RecorderNotifier {
    pub fn new(
        recorder: Arc<dyn PlayRecorder>,
        user_id: Option<UserId>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            recorder,
            user_id,
            events,
        }
    }
}

impl PlayNotifier for RecorderNotifier {
    fn notify_play(&self, track: &Track) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("No runtime available, skipping play record for {}", track.id());
            return;
        };

        let recorder = Arc::clone(&self.recorder);
        let user_id = self.user_id.clone();
        let events = self.events.clone();
        let track_id = track.id().clone();
        let title = track.title().to_string();

        runtime.spawn(async move {
            match recorder.record_play(&track_id, user_id.as_ref()).await {
                Ok(()) => debug!("Recorded play of {}", track_id),
                Err(e) => {
                    warn!("Failed to record play of {}: {}", track_id, e);
                    // Nobody listening is fine
                    let _ = events.send(SessionEvent::Notification(Notification::warning(
                        format!("Could not record play of \"{}\"", title),
                    )));
                }
            }
        });
    }
}
