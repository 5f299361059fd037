//! Session driver
//!
//! Owns a `Session` inside a tokio task. Surfaces talk to it through a
//! cloneable `SessionHandle`: commands go in over an unbounded channel,
//! snapshots come out through a `watch` channel and events through a
//! `broadcast` channel.
//!
//! The driver also runs the progress clock. Whenever the session's clock
//! lease changes (track change, pause, resume, stop) the ticker is re-armed
//! for the new lease, so a tick scheduled for an earlier track can never
//! reach the session.

use crate::{
    clock::ClockLease,
    error::{PlaybackError, Result},
    events::{Notification, SessionEvent, SessionSnapshot},
    media::MediaElement,
    recorder::RecorderNotifier,
    session::Session,
    types::{PlaybackContext, RepeatMode, SessionConfig},
};
use hymn_core::types::{Track, TrackId};
use hymn_core::PlayRecorder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Commands accepted by the driver
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Play {
        track: Track,
        context: Option<PlaybackContext>,
    },
    PlayCollection {
        tracks: Vec<Track>,
        start_index: usize,
        context: PlaybackContext,
    },
    Pause,
    Resume,
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    Seek(f64),
    SetVolume(f64),
    SetRepeat(RepeatMode),
    CycleRepeat,
    ToggleShuffle,
    SetShuffle(bool),
    Enqueue(Track),
    PlayNext(Track),
    ClearQueue,
    RemoveFromQueue(usize),
    MoveInQueue {
        from: usize,
        to: usize,
    },
    SetDuration(f64),
    MediaError(String),
    ReconcileRemoval {
        context: PlaybackContext,
        track_id: TrackId,
    },
    ReconcileAddition {
        context: PlaybackContext,
        track: Track,
    },
    Notify(Notification),
    Shutdown,
}

impl SessionCommand {
    /// Whether applying the command can end the current playing stretch
    fn releases_clock(&self) -> bool {
        matches!(self, Self::Pause | Self::TogglePlayPause | Self::Stop)
    }
}

/// Cloneable handle to a running driver
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Send a raw command
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::DriverClosed)
    }

    pub fn play(&self, track: Track, context: Option<PlaybackContext>) -> Result<()> {
        self.send(SessionCommand::Play { track, context })
    }

    pub fn play_collection(
        &self,
        tracks: Vec<Track>,
        start_index: usize,
        context: PlaybackContext,
    ) -> Result<()> {
        self.send(SessionCommand::PlayCollection {
            tracks,
            start_index,
            context,
        })
    }

    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(SessionCommand::Resume)
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.send(SessionCommand::TogglePlayPause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    pub fn next(&self) -> Result<()> {
        self.send(SessionCommand::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(SessionCommand::Previous)
    }

    pub fn seek(&self, position: f64) -> Result<()> {
        self.send(SessionCommand::Seek(position))
    }

    pub fn set_volume(&self, volume: f64) -> Result<()> {
        self.send(SessionCommand::SetVolume(volume))
    }

    pub fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.send(SessionCommand::SetRepeat(mode))
    }

    pub fn cycle_repeat(&self) -> Result<()> {
        self.send(SessionCommand::CycleRepeat)
    }

    pub fn toggle_shuffle(&self) -> Result<()> {
        self.send(SessionCommand::ToggleShuffle)
    }

    pub fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetShuffle(enabled))
    }

    /// Forward the real duration reported by the media element
    pub fn set_duration(&self, duration: f64) -> Result<()> {
        self.send(SessionCommand::SetDuration(duration))
    }

    /// Forward a media element failure for the current track
    pub fn report_media_error(&self, message: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::MediaError(message.into()))
    }

    pub fn enqueue(&self, track: Track) -> Result<()> {
        self.send(SessionCommand::Enqueue(track))
    }

    pub fn play_next(&self, track: Track) -> Result<()> {
        self.send(SessionCommand::PlayNext(track))
    }

    pub fn clear_queue(&self) -> Result<()> {
        self.send(SessionCommand::ClearQueue)
    }

    pub fn remove_from_queue(&self, index: usize) -> Result<()> {
        self.send(SessionCommand::RemoveFromQueue(index))
    }

    pub fn move_in_queue(&self, from: usize, to: usize) -> Result<()> {
        self.send(SessionCommand::MoveInQueue { from, to })
    }

    pub fn reconcile_removal(&self, context: PlaybackContext, track_id: TrackId) -> Result<()> {
        self.send(SessionCommand::ReconcileRemoval { context, track_id })
    }

    pub fn reconcile_addition(&self, context: PlaybackContext, track: Track) -> Result<()> {
        self.send(SessionCommand::ReconcileAddition { context, track })
    }

    pub fn notify(&self, notification: Notification) -> Result<()> {
        self.send(SessionCommand::Notify(notification))
    }

    /// Ask the driver to exit after the commands already queued
    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Ticker bound to one clock lease
struct Ticker {
    lease: Option<ClockLease>,
    interval: Interval,
    last: Instant,
}

impl Ticker {
    fn new(period: Duration) -> Self {
        let mut ticker = Self {
            lease: None,
            interval: time::interval(period),
            last: Instant::now(),
        };
        ticker.interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Re-arm for `lease`, first tick one period from now
    fn arm(&mut self, lease: Option<ClockLease>) {
        self.lease = lease;
        self.interval.reset();
        self.last = Instant::now();
    }

    /// Seconds since the previous tick
    fn elapsed(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

/// Runs a session on the tokio runtime
pub struct SessionDriver {
    session: Session,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionDriver {
    /// Create a driver and the handle that controls it
    ///
    /// With a `recorder`, every track start is reported to it in the
    /// background; failures show up as warning notifications.
    pub fn new(
        config: SessionConfig,
        media: Box<dyn MediaElement>,
        recorder: Option<Arc<dyn PlayRecorder>>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let user_id = config.user_id.clone();
        let mut session = Session::new(config).with_media(media);
        if let Some(recorder) = recorder {
            session = session.with_notifier(Box::new(RecorderNotifier::new(
                recorder,
                user_id,
                event_tx.clone(),
            )));
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let driver = Self {
            session,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
        };
        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
        };

        (driver, handle)
    }

    /// Spawn the driver loop on the current runtime
    pub fn spawn(self) -> JoinHandle<Session> {
        tokio::spawn(self.run())
    }

    /// Run until shutdown or until every handle is dropped
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(mut self) -> Session {
        info!("Playback session started");
        let mut ticker = Ticker::new(self.session.tick_interval());

        loop {
            if ticker.lease != self.session.clock_lease() {
                ticker.arm(self.session.clock_lease());
            }

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => {
                        self.credit_partial_tick(&mut ticker);
                        break;
                    }
                    Some(command) => {
                        if command.releases_clock() {
                            self.credit_partial_tick(&mut ticker);
                        }
                        self.apply(command);
                    }
                },
                _ = ticker.interval.tick(), if ticker.lease.is_some() => {
                    let elapsed = ticker.elapsed();
                    if let Some(lease) = ticker.lease {
                        self.session.tick(lease, elapsed);
                    }
                }
            }

            self.publish();
        }

        self.session.stop();
        self.publish();
        info!("Playback session stopped");
        self.session
    }

    /// Apply the time played since the last tick
    ///
    /// Ticks only arrive once per period; without this a pause or stop in
    /// the middle of a period would drop the partial interval.
    fn credit_partial_tick(&mut self, ticker: &mut Ticker) {
        if let Some(lease) = ticker.lease {
            let elapsed = ticker.elapsed();
            self.session.tick(lease, elapsed);
        }
    }

    fn apply(&mut self, command: SessionCommand) {
        debug!("Session command: {:?}", command);
        let session = &mut self.session;

        match command {
            SessionCommand::Play { track, context } => session.play(track, context),
            SessionCommand::PlayCollection {
                tracks,
                start_index,
                context,
            } => session.play_collection(tracks, start_index, context),
            SessionCommand::Pause => session.pause(),
            SessionCommand::Resume => session.resume(),
            SessionCommand::TogglePlayPause => session.toggle_play_pause(),
            SessionCommand::Stop => session.stop(),
            SessionCommand::Next => session.next(),
            SessionCommand::Previous => session.previous(),
            SessionCommand::Seek(position) => session.seek(position),
            SessionCommand::SetVolume(volume) => session.set_volume(volume),
            SessionCommand::SetRepeat(mode) => session.set_repeat(mode),
            SessionCommand::CycleRepeat => {
                session.cycle_repeat();
            }
            SessionCommand::ToggleShuffle => session.toggle_shuffle(),
            SessionCommand::SetShuffle(enabled) => session.set_shuffle(enabled),
            SessionCommand::Enqueue(track) => session.enqueue(track),
            SessionCommand::PlayNext(track) => session.play_next(track),
            SessionCommand::ClearQueue => session.clear_queue(),
            SessionCommand::RemoveFromQueue(index) => session.remove_from_queue(index),
            SessionCommand::MoveInQueue { from, to } => session.move_in_queue(from, to),
            SessionCommand::SetDuration(duration) => session.set_duration(duration),
            SessionCommand::MediaError(message) => session.report_media_error(&message),
            SessionCommand::ReconcileRemoval { context, track_id } => {
                session.reconcile_removal(&context, &track_id);
            }
            SessionCommand::ReconcileAddition { context, track } => {
                session.reconcile_addition(&context, track);
            }
            SessionCommand::Notify(notification) => session.notify(notification),
            SessionCommand::Shutdown => {}
        }
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.session.snapshot());
    }
}
