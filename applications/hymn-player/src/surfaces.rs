//! Presentation surfaces
//!
//! Mini-player bar, full-screen player and queue panel. Each is a pure
//! function of a `SessionSnapshot`: surfaces keep no playback state and run
//! no timers of their own.

use hymn_playback::{PlaybackContext, PlaybackStatus, RepeatMode, SessionSnapshot};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// Format seconds as `m:ss` (or `h:mm:ss` past an hour)
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total / 60) % 60, total % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Text progress bar for a fraction in [0, 1]
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn status_icon(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => ">",
        PlaybackStatus::Paused => "||",
        PlaybackStatus::Stopped => "[]",
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "repeat off",
        RepeatMode::All => "repeat all",
        RepeatMode::One => "repeat one",
    }
}

fn context_label(context: &PlaybackContext) -> String {
    match context {
        PlaybackContext::None => "single track".to_string(),
        PlaybackContext::Album(id) => format!("album {}", id),
        PlaybackContext::Playlist(id) => format!("playlist {}", id),
    }
}

/// One-line bar docked under every page
pub struct MiniPlayer;

impl MiniPlayer {
    pub fn render(snapshot: &SessionSnapshot) -> String {
        let Some(track) = &snapshot.current_track else {
            return "[] Nothing playing".to_string();
        };

        format!(
            "{} {} - {}  {} / {}",
            status_icon(snapshot.status),
            track.title(),
            track.artist(),
            format_time(snapshot.position),
            format_time(snapshot.duration),
        )
    }
}

/// Full-screen player with lyrics and mode indicators
pub struct FullPlayer;

impl FullPlayer {
    pub fn render(snapshot: &SessionSnapshot, is_favorite: bool) -> String {
        let mut out = String::new();

        let Some(track) = &snapshot.current_track else {
            out.push_str("Nothing playing\n");
            let _ = writeln!(out, "{} items up next", snapshot.queue.len());
            return out;
        };

        let heart = if is_favorite { " <3" } else { "" };
        let _ = writeln!(out, "{}{}", track.title(), heart);
        let _ = writeln!(out, "{}", track.artist());
        if let Some(album) = track.album() {
            let _ = writeln!(out, "{}", album);
        }
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "{} {} {} {}",
            status_icon(snapshot.status),
            format_time(snapshot.position),
            progress_bar(snapshot.progress(), BAR_WIDTH),
            format_time(snapshot.duration),
        );
        let _ = writeln!(
            out,
            "{} | shuffle {} | volume {}% | {}",
            repeat_label(snapshot.repeat),
            if snapshot.shuffle { "on" } else { "off" },
            (snapshot.volume * 100.0).round() as u32,
            context_label(&snapshot.context),
        );

        if let Some(lyrics) = track.lyrics() {
            let _ = writeln!(out);
            for line in lyrics.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }

        out
    }
}

/// Up-next list
pub struct QueuePanel;

impl QueuePanel {
    pub fn render(snapshot: &SessionSnapshot) -> String {
        let mut out = String::new();

        if let Some(track) = &snapshot.current_track {
            let _ = writeln!(out, "Now: {} ({})", track.title(), track.duration_label());
        }

        if snapshot.queue.is_empty() {
            out.push_str("Queue is empty\n");
            return out;
        }

        let heading = if snapshot.shuffle {
            "Up next (shuffled, any order):"
        } else {
            "Up next:"
        };
        let _ = writeln!(out, "{}", heading);
        for (i, track) in snapshot.queue.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {} - {} ({})",
                i,
                track.title(),
                track.artist(),
                track.duration_label()
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymn_core::{PlaylistId, Track};

    fn snapshot_with(track: Option<Track>) -> SessionSnapshot {
        SessionSnapshot {
            current_track: track,
            status: PlaybackStatus::Playing,
            position: 65.0,
            duration: 180.0,
            volume: 0.8,
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn formats_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 10), "[#####-----]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
        assert_eq!(progress_bar(0.0, 4), "[----]");
    }

    #[test]
    fn mini_player_shows_track_and_time() {
        let track = Track::new("a", "Abide With Me", "Choir", "3:00", "a.mp3");
        let line = MiniPlayer::render(&snapshot_with(Some(track)));
        assert_eq!(line, "> Abide With Me - Choir  1:05 / 3:00");

        assert_eq!(MiniPlayer::render(&SessionSnapshot::default()), "[] Nothing playing");
    }

    #[test]
    fn full_player_shows_modes_and_lyrics() {
        let track = Track::new("a", "Abide With Me", "Choir", "3:00", "a.mp3")
            .with_lyrics("Abide with me\nFast falls the eventide");
        let mut snapshot = snapshot_with(Some(track));
        snapshot.repeat = RepeatMode::All;
        snapshot.shuffle = true;
        snapshot.context = PlaybackContext::Playlist(PlaylistId::new("evensong"));

        let screen = FullPlayer::render(&snapshot, true);
        assert!(screen.starts_with("Abide With Me <3\n"));
        assert!(screen.contains("repeat all | shuffle on | volume 80% | playlist evensong"));
        assert!(screen.contains("  Fast falls the eventide"));
    }

    #[test]
    fn queue_panel_numbers_up_next() {
        let mut snapshot = snapshot_with(None);
        snapshot.queue = vec![
            Track::new("b", "Be Thou My Vision", "Choir", "3:40", "b.mp3"),
            Track::new("c", "It Is Well", "Quartet", "4:22", "c.mp3"),
        ];

        let panel = QueuePanel::render(&snapshot);
        assert!(panel.contains("  0. Be Thou My Vision - Choir (3:40)"));
        assert!(panel.contains("  1. It Is Well - Quartet (4:22)"));

        snapshot.queue.clear();
        assert!(QueuePanel::render(&snapshot).contains("Queue is empty"));
    }
}
