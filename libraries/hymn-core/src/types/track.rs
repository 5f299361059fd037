//! Track types
//!
//! `TrackRecord` is the open shape the catalog API hands back. `Track` is the
//! closed value the rest of the player works with: it is built once from a
//! record at the collaborator boundary and never reshaped downstream.

use super::ids::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Track as returned by the catalog API mapping layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Human-readable duration ("3:45", "1:02:03" or plain seconds)
    #[serde(default)]
    pub duration_label: String,
    pub audio_url: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Immutable playable item
///
/// Equality and hashing use the track ID only: two values with the same ID
/// are the same hymn even if one was fetched before a metadata edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TrackRecord", into = "TrackRecord")]
pub struct Track {
    id: TrackId,
    title: String,
    artist: String,
    album: Option<String>,
    duration_label: String,
    duration_secs: Option<f64>,
    audio_url: String,
    cover_url: String,
    lyrics: Option<String>,
    created_at: DateTime<Utc>,
}

impl Track {
    /// Create a track with the required fields; optional metadata stays empty
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_label: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        let duration_label = duration_label.into();
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration_secs: parse_duration_label(&duration_label),
            duration_label,
            audio_url: audio_url.into(),
            cover_url: String::new(),
            lyrics: None,
            created_at: Utc::now(),
        }
    }

    /// Attach an album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Attach lyrics
    #[must_use]
    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    /// Duration in seconds parsed from the label, if the label is well-formed
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }

    pub fn cover_url(&self) -> &str {
        &self.cover_url
    }

    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        Self {
            id: TrackId::new(record.id),
            title: record.title,
            artist: record.artist,
            album: record.album.filter(|a| !a.trim().is_empty()),
            duration_secs: parse_duration_label(&record.duration_label),
            duration_label: record.duration_label,
            audio_url: record.audio_url,
            cover_url: record.cover_url,
            lyrics: record.lyrics.filter(|l| !l.trim().is_empty()),
            created_at: record.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<Track> for TrackRecord {
    fn from(track: Track) -> Self {
        Self {
            id: track.id.as_str().to_string(),
            title: track.title,
            artist: track.artist,
            album: track.album,
            duration_label: track.duration_label,
            audio_url: track.audio_url,
            cover_url: track.cover_url,
            lyrics: track.lyrics,
            created_at: Some(track.created_at),
        }
    }
}

/// Parse a duration label into seconds
///
/// Accepts `ss`, `m:ss` and `h:mm:ss`. Minutes and seconds after the leading
/// field must be below 60.
pub fn parse_duration_label(label: &str) -> Option<f64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let parts = label
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let secs = match parts.as_slice() {
        [s] => *s,
        [m, s] if *s < 60 => m * 60 + s,
        [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
        _ => return None,
    };

    Some(secs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, label: &str) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            title: "Holy, Holy, Holy".to_string(),
            artist: "Reginald Heber".to_string(),
            album: Some(String::new()),
            duration_label: label.to_string(),
            audio_url: format!("https://cdn.example.org/{}.mp3", id),
            cover_url: String::new(),
            lyrics: Some("  ".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn parses_common_label_shapes() {
        assert_eq!(parse_duration_label("245"), Some(245.0));
        assert_eq!(parse_duration_label("3:45"), Some(225.0));
        assert_eq!(parse_duration_label(" 1:02:03 "), Some(3723.0));
        assert_eq!(parse_duration_label("0:00"), Some(0.0));
    }

    #[test]
    fn rejects_malformed_labels() {
        assert_eq!(parse_duration_label(""), None);
        assert_eq!(parse_duration_label("3:75"), None);
        assert_eq!(parse_duration_label("abc"), None);
        assert_eq!(parse_duration_label("1:2:3:4"), None);
        assert_eq!(parse_duration_label("-3:00"), None);
    }

    #[test]
    fn record_mapping_drops_blank_optionals() {
        let track = Track::from(record("holy", "4:00"));
        assert_eq!(track.album(), None);
        assert_eq!(track.lyrics(), None);
        assert_eq!(track.duration_secs(), Some(240.0));
    }

    #[test]
    fn equality_is_by_id_only() {
        let a = Track::new("t1", "Title A", "Artist", "1:00", "a.mp3");
        let b = Track::new("t1", "Edited title", "Other", "2:00", "b.mp3");
        let c = Track::new("t2", "Title A", "Artist", "1:00", "a.mp3");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserializes_from_api_shape() {
        let json = r#"{
            "id": "abide",
            "title": "Abide With Me",
            "artist": "Henry Francis Lyte",
            "durationLabel": "3:10",
            "audioUrl": "https://cdn.example.org/abide.mp3"
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id().as_str(), "abide");
        assert_eq!(track.duration_secs(), Some(190.0));
        assert_eq!(track.cover_url(), "");
    }
}
