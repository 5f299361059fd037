//! Driver tests on a paused tokio clock
//!
//! Time only moves when every task is idle, so one-second ticks are exact and
//! the tests run instantly.

use async_trait::async_trait;
use hymn_core::{HymnError, PlayRecorder, Track, TrackId, UserId};
use hymn_playback::{
    NotificationLevel, NullMedia, PlaybackContext, PlaybackError, PlaybackStatus, SessionConfig,
    SessionDriver, SessionEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn hymn(id: &str, duration: &str) -> Track {
    Track::new(id, format!("Hymn {}", id), "Choir", duration, format!("{}.mp3", id))
}

struct CountingRecorder {
    plays: AtomicUsize,
}

#[async_trait]
impl PlayRecorder for CountingRecorder {
    async fn record_play(
        &self,
        _track_id: &TrackId,
        _user_id: Option<&UserId>,
    ) -> hymn_core::Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingRecorder;

#[async_trait]
impl PlayRecorder for FailingRecorder {
    async fn record_play(
        &self,
        _track_id: &TrackId,
        _user_id: Option<&UserId>,
    ) -> hymn_core::Result<()> {
        Err(HymnError::network("backend unreachable"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_clock_ticks_once_per_second() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();
    sleep(Duration::from_millis(2500)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Playing);
    assert_eq!(snapshot.position, 2.0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_auto_advance_through_driver() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle
        .play_collection(
            vec![hymn("a", "0:03"), hymn("b", "0:05")],
            0,
            PlaybackContext::None,
        )
        .unwrap();

    sleep(Duration::from_millis(3500)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.current_track.unwrap().id().as_str(), "b");
    assert_eq!(snapshot.position, 0.0);

    sleep(Duration::from_secs(6)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Stopped);
    assert!(snapshot.current_track.is_none());

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_the_clock() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();
    sleep(Duration::from_millis(2500)).await;
    handle.pause().unwrap();
    sleep(Duration::from_secs(10)).await;
    // The half second since the last tick is credited on pause
    assert_eq!(handle.snapshot().position, 2.5);

    handle.resume().unwrap();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(handle.snapshot().position, 3.5);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_short_play_stretches_add_up() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();
    for _ in 0..5 {
        sleep(Duration::from_millis(900)).await;
        handle.pause().unwrap();
        sleep(Duration::from_millis(10)).await;
        handle.resume().unwrap();
    }
    sleep(Duration::from_millis(10)).await;

    let position = handle.snapshot().position;
    assert!((position - 4.5).abs() < 1e-9, "position {}", position);

    handle.shutdown().unwrap();
    let session = task.await.unwrap();
    assert_eq!(session.status(), PlaybackStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_stop_and_toggle_credit_partial_tick() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();
    sleep(Duration::from_millis(1700)).await;
    handle.toggle_play_pause().unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!((handle.snapshot().position - 1.7).abs() < 1e-9);

    handle.toggle_play_pause().unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.snapshot().status, PlaybackStatus::Playing);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_media_feedback_through_handle() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle
        .play_collection(
            vec![hymn("a", ""), hymn("b", "3:00")],
            0,
            PlaybackContext::None,
        )
        .unwrap();
    handle.set_duration(42.0).unwrap();
    handle.set_shuffle(true).unwrap();
    sleep(Duration::from_millis(10)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.duration, 42.0);
    assert!(snapshot.shuffle);

    handle.report_media_error("file not found").unwrap();
    sleep(Duration::from_millis(10)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.current_track.as_ref().unwrap().id().as_str(), "b");

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_events_reach_subscribers() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let mut events = handle.subscribe();
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();

    let event = timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        SessionEvent::TrackChanged {
            auto_advanced: false,
            ..
        }
    ));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_every_track_start_is_recorded() {
    let recorder = Arc::new(CountingRecorder {
        plays: AtomicUsize::new(0),
    });
    let (driver, handle) = SessionDriver::new(
        SessionConfig::default(),
        Box::new(NullMedia),
        Some(recorder.clone()),
    );
    let task = driver.spawn();

    handle
        .play_collection(
            vec![hymn("a", "0:02"), hymn("b", "3:00")],
            0,
            PlaybackContext::None,
        )
        .unwrap();
    sleep(Duration::from_secs(3)).await;

    assert_eq!(recorder.plays.load(Ordering::SeqCst), 2);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_play_record_is_only_a_notification() {
    let (driver, handle) = SessionDriver::new(
        SessionConfig::default(),
        Box::new(NullMedia),
        Some(Arc::new(FailingRecorder)),
    );
    let mut events = handle.subscribe();
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();

    let warning = timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(SessionEvent::Notification(n)) = events.recv().await {
                return n;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(warning.level, NotificationLevel::Warning);
    assert_eq!(handle.snapshot().status, PlaybackStatus::Playing);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_handle_reports_closed_driver() {
    let (driver, handle) = SessionDriver::new(SessionConfig::default(), Box::new(NullMedia), None);
    let task = driver.spawn();

    handle.play(hymn("a", "3:00"), None).unwrap();
    handle.shutdown().unwrap();
    let session = task.await.unwrap();

    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert!(matches!(handle.next(), Err(PlaybackError::DriverClosed)));
}
