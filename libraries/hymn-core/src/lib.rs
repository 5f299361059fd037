//! Hymnal Player Core
//!
//! Platform-agnostic core types, collaborator traits, and error handling for
//! Hymnal Player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackRecord` and the identifier newtypes
//! - **Collaborator Traits**: `PlayRecorder`, `PlaylistStore`, `FavoritesStore`
//! - **Error Handling**: Unified `HymnError` and `Result` types
//!
//! Tracks are built once from a `TrackRecord` (the shape the catalog API
//! returns) and are never reshaped afterwards.
//!
//! # Example
//!
//! ```rust
//! use hymn_core::types::{Track, TrackRecord};
//!
//! let record = TrackRecord {
//!     id: "amazing-grace".to_string(),
//!     title: "Amazing Grace".to_string(),
//!     artist: "John Newton".to_string(),
//!     album: Some("Olney Hymns".to_string()),
//!     duration_label: "4:05".to_string(),
//!     audio_url: "https://cdn.example.org/amazing-grace.mp3".to_string(),
//!     cover_url: "https://cdn.example.org/olney.jpg".to_string(),
//!     lyrics: None,
//!     created_at: None,
//! };
//!
//! let track = Track::from(record);
//! assert_eq!(track.duration_secs(), Some(245.0));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{HymnError, Result};
pub use traits::{FavoritesStore, PlayRecorder, PlaylistStore};
pub use types::{AlbumId, PlaylistId, Track, TrackId, TrackRecord, UserId};
