//! Behavioral tests for the playback session
//!
//! Each test drives a real `Session` through a listening scenario and checks
//! the state surfaces would render afterwards.

use hymn_core::{AlbumId, PlaylistId, Track, TrackId};
use hymn_playback::{
    PlaybackContext, PlaybackStatus, RepeatMode, Session, SessionConfig, SessionEvent,
};

// ===== Test Helpers =====

fn hymn(id: &str, duration: &str) -> Track {
    Track::new(
        id,
        format!("Hymn {}", id.to_uppercase()),
        "Parish Choir",
        duration,
        format!("https://cdn.example.org/{}.mp3", id),
    )
}

fn abc() -> Vec<Track> {
    vec![hymn("a", "3:00"), hymn("b", "2:30"), hymn("c", "4:00")]
}

fn session() -> Session {
    Session::new(SessionConfig {
        shuffle_seed: Some(2024),
        ..SessionConfig::default()
    })
}

fn current_id(session: &Session) -> Option<String> {
    session.current_track().map(|t| t.id().to_string())
}

fn auto_advances(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SessionEvent::TrackChanged {
                    auto_advanced: true,
                    ..
                }
            )
        })
        .count()
}

// ===== Repeat =====

#[test]
fn test_repeat_cycles_back_after_three_steps() {
    for start in [RepeatMode::Off, RepeatMode::All, RepeatMode::One] {
        let mut session = session();
        session.set_repeat(start);

        session.cycle_repeat();
        session.cycle_repeat();
        session.cycle_repeat();

        assert_eq!(session.repeat(), start);
    }
}

#[test]
fn test_repeat_one_loops_current_track_both_directions() {
    let mut session = session();
    session.play_collection(abc(), 0, PlaybackContext::None);
    session.set_repeat(RepeatMode::One);

    for _ in 0..5 {
        session.next();
        assert_eq!(current_id(&session).as_deref(), Some("a"));
        session.previous();
        assert_eq!(current_id(&session).as_deref(), Some("a"));
    }
    assert_eq!(session.status(), PlaybackStatus::Playing);
}

#[test]
fn test_repeat_one_restarts_track_from_zero() {
    let mut session = session();
    session.play(hymn("a", "3:00"), None);
    session.set_repeat(RepeatMode::One);
    session.seek(120.0);

    session.next();
    assert_eq!(session.position(), 0.0);
}

// ===== Queue Order =====

#[test]
fn test_repeat_all_cycles_in_original_order() {
    let mut session = session();
    session.play_collection(abc(), 0, PlaybackContext::None);
    session.set_repeat(RepeatMode::All);

    let mut played = Vec::new();
    for _ in 0..7 {
        session.next();
        played.push(current_id(&session).unwrap());
    }

    assert_eq!(played, vec!["b", "c", "a", "b", "c", "a", "b"]);
}

#[test]
fn test_exhausted_queue_without_repeat_stops() {
    let mut session = session();
    session.play_collection(vec![hymn("a", "3:00"), hymn("b", "3:00")], 1, PlaybackContext::None);

    session.next();

    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert!(session.current_track().is_none());
    assert_eq!(session.position(), 0.0);
}

#[test]
fn test_previous_at_head_stops_without_repeat() {
    let mut session = session();
    session.play_collection(abc(), 0, PlaybackContext::None);

    session.previous();
    assert_eq!(session.status(), PlaybackStatus::Stopped);
}

#[test]
fn test_previous_ignores_shuffle_order() {
    let mut session = session();
    session.play_collection(
        vec![
            hymn("a", "1:00"),
            hymn("b", "1:00"),
            hymn("c", "1:00"),
            hymn("d", "1:00"),
            hymn("e", "1:00"),
        ],
        2,
        PlaybackContext::None,
    );
    session.toggle_shuffle();

    session.previous();
    assert_eq!(current_id(&session).as_deref(), Some("b"));
    session.previous();
    assert_eq!(current_id(&session).as_deref(), Some("a"));
}

// ===== Shuffle =====

#[test]
fn test_shuffle_plays_each_track_once_then_stops() {
    let tracks: Vec<Track> = (0..8).map(|i| hymn(&format!("h{}", i), "2:00")).collect();
    let mut session = session();
    session.toggle_shuffle();
    session.play_collection(tracks, 0, PlaybackContext::None);

    let mut seen = vec![current_id(&session).unwrap()];
    while session.status() == PlaybackStatus::Playing {
        session.next();
        if let Some(id) = current_id(&session) {
            assert!(!seen.contains(&id), "{} played twice in one cycle", id);
            seen.push(id);
        }
    }

    assert_eq!(seen.len(), 8);
}

#[test]
fn test_shuffle_with_repeat_all_starts_new_cycle() {
    let tracks: Vec<Track> = (0..4).map(|i| hymn(&format!("h{}", i), "2:00")).collect();
    let mut session = session();
    session.set_shuffle(true);
    session.set_repeat(RepeatMode::All);
    session.play_collection(tracks, 0, PlaybackContext::None);

    let mut first_cycle = vec![current_id(&session).unwrap()];
    for _ in 0..3 {
        session.next();
        first_cycle.push(current_id(&session).unwrap());
    }
    let last = first_cycle.last().cloned();

    session.next();
    assert_eq!(session.status(), PlaybackStatus::Playing);
    assert_ne!(current_id(&session), last);

    first_cycle.sort();
    assert_eq!(first_cycle, vec!["h0", "h1", "h2", "h3"]);
}

#[test]
fn test_seeded_shuffle_is_reproducible() {
    let run = || {
        let tracks: Vec<Track> = (0..10).map(|i| hymn(&format!("h{}", i), "2:00")).collect();
        let mut session = session();
        session.toggle_shuffle();
        session.play_collection(tracks, 0, PlaybackContext::None);
        let mut order = Vec::new();
        for _ in 0..9 {
            session.next();
            order.push(current_id(&session).unwrap());
        }
        order
    };

    assert_eq!(run(), run());
}

// ===== Progress Clock =====

#[test]
fn test_auto_advance_fires_exactly_once() {
    let mut session = session();
    session.play_collection(
        vec![hymn("a", "0:03"), hymn("b", "3:00"), hymn("c", "3:00")],
        0,
        PlaybackContext::None,
    );
    session.drain_events();

    // One tick covers both the duration and the 99.5% threshold
    session.advance_clock(1.0);
    session.advance_clock(1.0);
    session.advance_clock(1.5);

    let events = session.drain_events();
    assert_eq!(auto_advances(&events), 1);
    assert_eq!(current_id(&session).as_deref(), Some("b"));
    assert_eq!(session.position(), 0.0);
}

#[test]
fn test_near_completion_threshold_advances_early() {
    let mut session = session();
    session.play_collection(
        vec![hymn("a", "3:20"), hymn("b", "3:00")],
        0,
        PlaybackContext::None,
    );

    // 99.5% of 200s is 199s
    session.advance_clock(198.5);
    assert_eq!(current_id(&session).as_deref(), Some("a"));
    session.advance_clock(0.5);
    assert_eq!(current_id(&session).as_deref(), Some("b"));
    assert_eq!(auto_advances(&session.drain_events()), 1);
}

#[test]
fn test_stale_lease_tick_is_ignored() {
    let mut session = session();
    session.play_collection(abc(), 0, PlaybackContext::None);
    let stale = session.clock_lease().unwrap();

    session.next();
    session.tick(stale, 500.0);

    assert_eq!(current_id(&session).as_deref(), Some("b"));
    assert_eq!(session.position(), 0.0);
}

#[test]
fn test_clock_does_not_run_while_paused() {
    let mut session = session();
    session.play(hymn("a", "3:00"), None);
    session.advance_clock(10.0);
    session.pause();

    session.advance_clock(10.0);
    assert_eq!(session.position(), 10.0);

    session.resume();
    session.advance_clock(1.0);
    assert_eq!(session.position(), 11.0);
}

#[test]
fn test_auto_advance_on_last_track_stops() {
    let mut session = session();
    session.play(hymn("a", "0:02"), None);

    session.advance_clock(1.0);
    session.advance_clock(1.0);

    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert!(session.clock_lease().is_none());
}

#[test]
fn test_zero_duration_never_auto_advances() {
    let mut session = session();
    session.play_collection(
        vec![hymn("a", "unknown"), hymn("b", "3:00")],
        0,
        PlaybackContext::None,
    );

    for _ in 0..10 {
        session.advance_clock(1.0);
    }
    assert_eq!(current_id(&session).as_deref(), Some("a"));
    assert_eq!(session.position(), 0.0);
}

// ===== Context Binding =====

#[test]
fn test_removing_queued_track_from_bound_playlist() {
    let playlist = PlaybackContext::Playlist(PlaylistId::new("lent"));
    let mut session = session();
    session.play_collection(
        vec![hymn("a", "3:00"), hymn("b", "3:00")],
        0,
        playlist.clone(),
    );

    assert!(session.reconcile_removal(&playlist, &TrackId::new("b")));
    assert!(session.up_next().is_empty());

    session.next();
    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(session.context(), &playlist);
}

#[test]
fn test_context_is_sticky_across_next() {
    let album = PlaybackContext::Album(AlbumId::new("advent"));
    let mut session = session();
    session.play_collection(abc(), 0, album.clone());

    session.next();
    session.next();
    session.previous();

    assert_eq!(session.context(), &album);
}

#[test]
fn test_emptied_context_degrades_to_stop() {
    let playlist = PlaybackContext::Playlist(PlaylistId::new("short"));
    let mut session = session();
    session.play_collection(vec![hymn("a", "3:00")], 0, playlist.clone());

    session.reconcile_removal(&playlist, &TrackId::new("a"));
    assert_eq!(current_id(&session).as_deref(), Some("a"));
    assert_eq!(session.status(), PlaybackStatus::Playing);

    session.next();
    assert_eq!(session.status(), PlaybackStatus::Stopped);
    session.previous();
    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(session.context(), &playlist);
}

// ===== Clamping =====

#[test]
fn test_seek_is_clamped_to_track() {
    let mut session = session();
    session.play(hymn("a", "3:20"), None);

    session.seek(-5.0);
    assert_eq!(session.position(), 0.0);

    session.seek(9999.0);
    assert_eq!(session.position(), 200.0);
    assert_eq!(session.status(), PlaybackStatus::Playing);
}

#[test]
fn test_controls_without_track_are_safe() {
    let mut session = session();
    session.pause();
    session.resume();
    session.seek(30.0);
    session.next();
    session.previous();
    session.stop();
    session.clear_queue();
    session.remove_from_queue(3);

    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(session.position(), 0.0);
}
