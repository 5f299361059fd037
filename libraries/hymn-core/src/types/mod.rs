mod ids;
mod track;

pub use ids::{AlbumId, PlaylistId, TrackId, UserId};
pub use track::{parse_duration_label, Track, TrackRecord};
