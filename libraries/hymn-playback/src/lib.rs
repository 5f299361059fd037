//! Hymnal Player - Playback Session
//!
//! Platform-agnostic playback core for Hymnal Player.
//!
//! This crate provides:
//! - One playback session per process (current track, status, position, volume)
//! - Index-based queue that keeps original order for "previous"
//! - Repeat (Off, All, One) and shuffle resolution
//! - Progress clock with a single guarded auto-advance per track
//! - Context binding: queue follows edits to the bound album or playlist
//! - Snapshots and events for the presentation surfaces
//!
//! # Architecture
//!
//! `hymn-playback` never touches audio or the network directly:
//! - The audio element is a `MediaElement` trait object
//! - Play counts, playlists and favorites are `hymn-core` traits
//! - `Session` is synchronous; `SessionDriver` runs it on tokio and owns the clock
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use hymn_playback::{PlaybackContext, PlaybackStatus, Session, SessionConfig};
//! use hymn_core::Track;
//!
//! let mut session = Session::new(SessionConfig::default());
//!
//! let hymns = vec![
//!     Track::new("abide", "Abide With Me", "Choir", "3:10", "abide.mp3"),
//!     Track::new("nearer", "Nearer, My God, to Thee", "Choir", "2:45", "nearer.mp3"),
//! ];
//! session.play_collection(hymns, 0, PlaybackContext::None);
//! assert_eq!(session.status(), PlaybackStatus::Playing);
//!
//! // One clock tick per second while playing
//! session.advance_clock(1.0);
//! assert_eq!(session.position(), 1.0);
//!
//! session.next();
//! assert_eq!(session.current_track().unwrap().title(), "Nearer, My God, to Thee");
//! ```
//!
//! # Example: Shuffle and Repeat
//!
//! ```rust
//! use hymn_playback::{RepeatMode, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//!
//! session.toggle_shuffle();
//! assert_eq!(session.cycle_repeat(), RepeatMode::All);
//! assert_eq!(session.cycle_repeat(), RepeatMode::One);
//! ```
//!
//! # Example: Driver
//!
//! ```rust,no_run
//! use hymn_playback::{NullMedia, SessionConfig, SessionDriver};
//!
//! # async fn run() -> hymn_playback::Result<()> {
//! let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
//! let task = driver.spawn();
//!
//! let mut events = handle.subscribe();
//! handle.toggle_play_pause()?;
//! handle.shutdown()?;
//! # let _ = (events.try_recv(), task.await);
//! # Ok(())
//! # }
//! ```

mod actions;
pub mod clock;
mod driver;
mod error;
mod events;
mod media;
pub mod queue;
mod recorder;
pub mod resolver;
mod session;
pub mod types;

// Public exports
pub use actions::{FavoriteActions, PlaylistActions};
pub use clock::{ClockLease, ProgressClock};
pub use driver::{SessionCommand, SessionDriver, SessionHandle};
pub use error::{PlaybackError, Result};
pub use events::{Notification, NotificationLevel, SessionEvent, SessionSnapshot};
pub use media::{MediaElement, NullMedia};
pub use queue::Queue;
pub use recorder::{NoopNotifier, PlayNotifier, RecorderNotifier};
pub use resolver::Resolution;
pub use session::Session;
pub use types::{PlaybackContext, PlaybackStatus, RepeatMode, SessionConfig};
