//! Playback session - the single source of truth for "now playing"
//!
//! Coordinates queue, resolver, clock, context binding and the media element.
//! Every public operation is infallible: out-of-range input is clamped,
//! operations that need a current track are no-ops without one, and running
//! out of tracks is a transition to `Stopped`.

use crate::{
    clock::{ClockLease, ProgressClock},
    events::{Notification, SessionEvent, SessionSnapshot},
    media::{MediaElement, NullMedia},
    queue::Queue,
    recorder::{NoopNotifier, PlayNotifier},
    resolver::{self, Resolution},
    types::{PlaybackContext, PlaybackStatus, RepeatMode, SessionConfig},
};
use hymn_core::types::{Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Central playback state
///
/// Construct one per process at startup and hand it (or the driver wrapping
/// it) to every surface. There is no global instance.
pub struct Session {
    // State
    status: PlaybackStatus,
    current_track: Option<Track>,
    position: f64,
    duration: f64,

    // Settings
    volume: f64,
    repeat: RepeatMode,
    shuffle: bool,

    // Queue and binding
    queue: Queue,
    context: PlaybackContext,

    clock: ProgressClock,
    rng: StdRng,

    // Collaborators
    media: Box<dyn MediaElement>,
    notifier: Box<dyn PlayNotifier>,

    // Event queue for surface synchronization
    pending_events: Vec<SessionEvent>,
}

impl Session {
    /// Create a stopped session with no media element and no play recording
    pub fn new(config: SessionConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let volume = if config.volume.is_finite() {
            config.volume.clamp(0.0, 1.0)
        } else {
            SessionConfig::default().volume
        };

        Self {
            status: PlaybackStatus::Stopped,
            current_track: None,
            position: 0.0,
            duration: 0.0,
            volume,
            repeat: config.repeat,
            shuffle: config.shuffle,
            queue: Queue::new(),
            context: PlaybackContext::None,
            clock: ProgressClock::new(config.tick_interval, config.near_completion),
            rng,
            media: Box::new(NullMedia),
            notifier: Box::new(NoopNotifier),
            pending_events: Vec::new(),
        }
    }

    /// Attach the media element the session mirrors its state into
    #[must_use]
    pub fn with_media(mut self, media: Box<dyn MediaElement>) -> Self {
        self.media = media;
        self.media.set_volume(self.volume);
        self
    }

    /// Attach the play-count notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn PlayNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // ===== Playback Control =====

    /// Start playing `track`, replacing whatever plays now
    ///
    /// Binds `context`, or unbinds when `None` is given. A track already in
    /// the queue keeps its place; any other track is inserted after the
    /// cursor so "up next" is unchanged.
    pub fn play(&mut self, track: Track, context: Option<PlaybackContext>) {
        self.queue.select(&track);
        self.bind_context(context.unwrap_or_default());
        self.start_track(track, false);
        self.emit_queue_changed();
    }

    /// Replace the queue with a collection and start at `start_index`
    ///
    /// The index is clamped to the last track. An empty collection is ignored.
    pub fn play_collection(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        context: PlaybackContext,
    ) {
        let Some(track) = self.queue.load(tracks, start_index) else {
            debug!("Ignoring play request for an empty collection");
            return;
        };

        self.bind_context(context);
        self.start_track(track, false);
        self.emit_queue_changed();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.clock.release();
            self.media.pause();
            self.set_status(PlaybackStatus::Paused);
        }
    }

    /// Resume paused playback
    pub fn resume(&mut self) {
        if self.status == PlaybackStatus::Paused {
            self.media.play();
            self.clock.acquire();
            self.set_status(PlaybackStatus::Playing);
        }
    }

    /// Pause when playing, resume when paused
    pub fn toggle_play_pause(&mut self) {
        match self.status {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
            PlaybackStatus::Stopped => {}
        }
    }

    /// Stop playback
    ///
    /// Clears the current track but keeps the queue.
    pub fn stop(&mut self) {
        if self.current_track.is_none() && self.status == PlaybackStatus::Stopped {
            return;
        }

        self.clock.release();
        self.media.stop();
        self.current_track = None;
        self.position = 0.0;
        self.duration = 0.0;
        self.queue.detach_current();
        self.set_status(PlaybackStatus::Stopped);
    }

    /// Skip to the next track
    ///
    /// Stops when nothing is left to play. The bound context is kept.
    pub fn next(&mut self) {
        self.advance(false);
    }

    /// Go to the previous track in original queue order
    ///
    /// Repeat-one replays the current track. Otherwise stops at the head of
    /// the queue.
    pub fn previous(&mut self) {
        let resolution =
            resolver::resolve_previous(self.current_track.as_ref(), &self.queue, self.repeat);
        self.apply_resolution(resolution, false);
    }

    // ===== Seek & Volume =====

    /// Seek to a position in seconds, clamped to the track duration
    pub fn seek(&mut self, position: f64) {
        if self.current_track.is_none() || !position.is_finite() {
            return;
        }

        self.position = position.clamp(0.0, self.duration);
        self.media.seek(self.position);
        self.emit(SessionEvent::PositionChanged {
            position: self.position,
            duration: self.duration,
        });
    }

    /// Set volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        if volume != self.volume {
            self.volume = volume;
            self.media.set_volume(volume);
            self.emit(SessionEvent::VolumeChanged { volume });
        }
    }

    // ===== Shuffle & Repeat =====

    /// Set repeat mode
    ///
    /// The mode walks forward along `Off -> All -> One -> Off` until it
    /// reaches `mode`, so no transition ever skips the cycle.
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat == mode {
            return;
        }

        while self.repeat != mode {
            self.repeat = self.repeat.cycled();
        }
        self.emit(SessionEvent::RepeatChanged { mode });
    }

    /// Advance the repeat mode one step and return the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.set_repeat(self.repeat.cycled());
        self.repeat
    }

    /// Flip the shuffle flag
    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.shuffle);
    }

    /// Enable or disable shuffle
    ///
    /// Queue contents are untouched; only future resolution changes.
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle == enabled {
            return;
        }

        if enabled {
            self.queue.mark_played_through_cursor();
        }
        self.shuffle = enabled;
        self.emit(SessionEvent::ShuffleChanged { enabled });
        self.emit_queue_changed();
    }

    // ===== Queue Management =====

    /// Append a track to the queue
    pub fn enqueue(&mut self, track: Track) {
        self.queue.append(track);
        self.emit_queue_changed();
    }

    /// Queue a track to play directly after the current one
    pub fn play_next(&mut self, track: Track) {
        self.queue.insert_next(track);
        self.emit_queue_changed();
    }

    /// Empty the up-next list, leaving the current track alone
    pub fn clear_queue(&mut self) {
        self.queue.clear_upcoming();
        self.emit_queue_changed();
    }

    /// Remove the track at `index` of the up-next list
    pub fn remove_from_queue(&mut self, index: usize) {
        let removed = if self.shuffle {
            let absolute = self.queue.unplayed_indices().get(index).copied();
            absolute.and_then(|i| self.queue.remove_entry(i))
        } else {
            self.queue.remove_upcoming(index)
        };

        if let Some(track) = removed {
            debug!("Removed {} from queue", track.id());
            self.emit_queue_changed();
        }
    }

    /// Move a track within the up-next list
    ///
    /// No-op while shuffle is on: the list order does not decide what plays.
    pub fn move_in_queue(&mut self, from: usize, to: usize) {
        if self.shuffle {
            return;
        }

        if from != to && self.queue.move_upcoming(from, to) {
            self.emit_queue_changed();
        }
    }

    // ===== Context Binding =====

    /// Drop a track that was removed from a collection
    ///
    /// Applies only when `context` is the bound collection. The current track
    /// keeps playing even if it is the one removed; only later resolution
    /// changes. Returns whether the queue changed.
    pub fn reconcile_removal(&mut self, context: &PlaybackContext, track_id: &TrackId) -> bool {
        if !context.is_bound() || *context != self.context {
            return false;
        }

        let removed = self.queue.remove_track(track_id);
        if removed == 0 {
            return false;
        }

        debug!("Reconciled removal of {} ({} entries)", track_id, removed);
        self.emit_queue_changed();
        true
    }

    /// Append a track that was added to the bound collection
    pub fn reconcile_addition(&mut self, context: &PlaybackContext, track: Track) -> bool {
        if !context.is_bound() || *context != self.context {
            return false;
        }

        debug!("Reconciled addition of {}", track.id());
        self.queue.append(track);
        self.emit_queue_changed();
        true
    }

    // ===== Clock & Media Feedback =====

    /// Apply elapsed time from the progress clock
    ///
    /// Ignored unless `lease` is the clock's current lease and the session is
    /// playing. Reaching the end (or the near-completion threshold) advances
    /// exactly once per track.
    pub fn tick(&mut self, lease: ClockLease, elapsed: f64) {
        if !self.clock.accepts(lease) || self.status != PlaybackStatus::Playing {
            return;
        }

        self.position = ProgressClock::advance(self.position, elapsed, self.duration);

        if self.clock.take_auto_advance(self.position, self.duration) {
            if let Some(track) = &self.current_track {
                info!("Track finished: {}", track.title());
            }
            self.advance(true);
        }
    }

    /// Tick with whatever lease is current (simulations and tests)
    pub fn advance_clock(&mut self, elapsed: f64) {
        if let Some(lease) = self.clock.lease() {
            self.tick(lease, elapsed);
        }
    }

    /// The media element reported the real duration of the current track
    pub fn set_duration(&mut self, duration: f64) {
        if self.current_track.is_none() || !duration.is_finite() || duration < 0.0 {
            return;
        }

        self.duration = duration;
        self.position = self.position.min(duration);
        self.emit(SessionEvent::PositionChanged {
            position: self.position,
            duration,
        });
    }

    /// The media element could not play the current track
    ///
    /// Notifies the user and moves on so one broken file does not stall the
    /// session. Repeat-one is not honoured here, it would retry forever.
    pub fn report_media_error(&mut self, message: &str) {
        let Some(track) = &self.current_track else {
            return;
        };

        warn!("Media error on {}: {}", track.id(), message);
        let notification = Notification::error(format!(
            "Could not play \"{}\": {}",
            track.title(),
            message
        ));
        self.emit(SessionEvent::Notification(notification));

        let repeat = match self.repeat {
            RepeatMode::One => RepeatMode::Off,
            other => other,
        };
        let resolution = resolver::resolve_next(
            self.current_track.as_ref(),
            &self.queue,
            repeat,
            self.shuffle,
            &mut self.rng,
        );
        self.apply_resolution(resolution, true);
    }

    /// Queue a notification for surfaces
    pub fn notify(&mut self, notification: Notification) {
        self.emit(SessionEvent::Notification(notification));
    }

    // ===== State Queries =====

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration in seconds (0 when unknown)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.context
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// The up-next list as surfaces show it
    ///
    /// In order mode: entries after the cursor. With shuffle: the entries the
    /// next draw picks from.
    pub fn up_next(&self) -> Vec<Track> {
        if self.shuffle {
            self.queue.unplayed().into_iter().cloned().collect()
        } else {
            self.queue.upcoming().to_vec()
        }
    }

    /// Lease of the running clock, `None` unless playing
    pub fn clock_lease(&self) -> Option<ClockLease> {
        self.clock.lease()
    }

    pub fn tick_interval(&self) -> Duration {
        self.clock.interval()
    }

    /// Snapshot for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_track: self.current_track.clone(),
            status: self.status,
            position: self.position,
            duration: self.duration,
            volume: self.volume,
            repeat: self.repeat,
            shuffle: self.shuffle,
            queue: self.up_next(),
            context: self.context.clone(),
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    fn advance(&mut self, auto: bool) {
        let resolution = resolver::resolve_next(
            self.current_track.as_ref(),
            &self.queue,
            self.repeat,
            self.shuffle,
            &mut self.rng,
        );
        self.apply_resolution(resolution, auto);
    }

    fn apply_resolution(&mut self, resolution: Option<Resolution>, auto: bool) {
        match resolution {
            Some(Resolution::Current) => match self.current_track.clone() {
                Some(track) => self.start_track(track, auto),
                None => self.stop(),
            },
            Some(entry) => match self.queue.commit(entry) {
                Some(track) => {
                    self.start_track(track, auto);
                    self.emit_queue_changed();
                }
                None => self.stop(),
            },
            None => {
                debug!("Nothing left to play, stopping");
                self.stop();
            }
        }
    }

    /// Load a track and start the clock for it
    fn start_track(&mut self, track: Track, auto: bool) {
        self.clock.release();
        self.clock.reset_track();

        self.position = 0.0;
        self.duration = track.duration_secs().unwrap_or(0.0);

        self.media.load(track.audio_url());
        self.media.play();
        self.notifier.notify_play(&track);

        info!("Now playing: {} ({})", track.title(), track.id());

        let previous_track_id = self.current_track.as_ref().map(|t| t.id().clone());
        self.emit(SessionEvent::TrackChanged {
            track_id: track.id().clone(),
            previous_track_id,
            auto_advanced: auto,
        });

        self.current_track = Some(track);
        self.set_status(PlaybackStatus::Playing);
        self.clock.acquire();
    }

    fn bind_context(&mut self, context: PlaybackContext) {
        if context != self.context {
            debug!("Binding playback context {:?}", context);
            self.context = context.clone();
            self.emit(SessionEvent::ContextChanged { context });
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.emit(SessionEvent::StatusChanged { status });
        }
    }

    fn emit_queue_changed(&mut self) {
        let length = if self.shuffle {
            self.queue.unplayed_indices().len()
        } else {
            self.queue.upcoming().len()
        };
        self.emit(SessionEvent::QueueChanged { length });
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status)
            .field("current_track", &self.current_track.as_ref().map(|t| t.id()))
            .field("position", &self.position)
            .field("duration", &self.duration)
            .field("volume", &self.volume)
            .field("repeat", &self.repeat)
            .field("shuffle", &self.shuffle)
            .field("queue_len", &self.queue.len())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
