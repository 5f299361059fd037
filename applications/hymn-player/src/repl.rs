//! Line-oriented player console
//!
//! Each line is one surface action. State is always read back from the
//! session snapshot; the console keeps nothing of its own.

use crate::catalog::{Hymnal, MemoryFavorites};
use crate::error::{PlayerError, Result};
use crate::surfaces::{FullPlayer, MiniPlayer, QueuePanel};
use hymn_core::{AlbumId, PlaylistId, PlaylistStore, TrackId, UserId};
use hymn_playback::{
    FavoriteActions, PlaybackContext, PlaylistActions, RepeatMode, SessionHandle, SessionSnapshot,
};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::debug;

/// How long to wait for the driver to publish after a command
const PUBLISH_WAIT: Duration = Duration::from_millis(250);

pub const HELP: &str = "\
Playback:  play <hymn> | album <id> [n] | playlist <id> [n] | pause | resume | toggle
           stop | next | prev | seek <secs> | vol <0-1> | repeat [off|all|one] | shuffle
Queue:     queue | enqueue <hymn> | playnext <hymn> | clear | remove <n> | move <from> <to>
Library:   hymns | albums | playlists | add <playlist> <hymn> | drop <playlist> <hymn> | fav
Display:   status | full | json
Other:     offline on|off | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Play(String),
    Album { id: String, start: usize },
    Playlist { id: String, start: usize },
    Pause,
    Resume,
    Toggle,
    Stop,
    Next,
    Previous,
    Seek(f64),
    Volume(f64),
    Repeat(Option<RepeatMode>),
    Shuffle,
    Queue,
    Enqueue(String),
    PlayNext(String),
    Clear,
    Remove(usize),
    Move(usize, usize),
    Hymns,
    Albums,
    Playlists,
    Add { playlist: String, hymn: String },
    Drop { playlist: String, hymn: String },
    Favorite,
    Status,
    Full,
    Json,
    Offline(bool),
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one input line; blank lines and `#` comments give `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("play", [id]) => Self::Play((*id).to_string()),
            ("album", [id]) => Self::Album { id: (*id).to_string(), start: 0 },
            ("album", [id, n]) => Self::Album { id: (*id).to_string(), start: number(n)? },
            ("playlist", [id]) => Self::Playlist { id: (*id).to_string(), start: 0 },
            ("playlist", [id, n]) => Self::Playlist { id: (*id).to_string(), start: number(n)? },
            ("pause", []) => Self::Pause,
            ("resume", []) => Self::Resume,
            ("toggle", []) => Self::Toggle,
            ("stop", []) => Self::Stop,
            ("next", []) => Self::Next,
            ("prev" | "previous", []) => Self::Previous,
            ("seek", [secs]) => Self::Seek(float(secs)?),
            ("vol" | "volume", [v]) => Self::Volume(float(v)?),
            ("repeat", []) => Self::Repeat(None),
            ("repeat", [mode]) => Self::Repeat(Some(RepeatMode::from_str(mode).ok_or_else(
                || PlayerError::invalid_command(format!("repeat mode {:?}", mode)),
            )?)),
            ("shuffle", []) => Self::Shuffle,
            ("queue", []) => Self::Queue,
            ("enqueue", [id]) => Self::Enqueue((*id).to_string()),
            ("playnext", [id]) => Self::PlayNext((*id).to_string()),
            ("clear", []) => Self::Clear,
            ("remove", [n]) => Self::Remove(number(n)?),
            ("move", [from, to]) => Self::Move(number(from)?, number(to)?),
            ("hymns", []) => Self::Hymns,
            ("albums", []) => Self::Albums,
            ("playlists", []) => Self::Playlists,
            ("add", [playlist, hymn]) => Self::Add {
                playlist: (*playlist).to_string(),
                hymn: (*hymn).to_string(),
            },
            ("drop", [playlist, hymn]) => Self::Drop {
                playlist: (*playlist).to_string(),
                hymn: (*hymn).to_string(),
            },
            ("fav", []) => Self::Favorite,
            ("status", []) => Self::Status,
            ("full", []) => Self::Full,
            ("json", []) => Self::Json,
            ("offline", ["on"]) => Self::Offline(true),
            ("offline", ["off"]) => Self::Offline(false),
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(PlayerError::invalid_command(line)),
        };

        Ok(Some(command))
    }
}

fn number(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| PlayerError::invalid_command(format!("expected a number, got {:?}", s)))
}

fn float(s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| PlayerError::invalid_command(format!("expected a number, got {:?}", s)))
}

/// Console bound to one session
pub struct Repl {
    hymnal: Arc<Hymnal>,
    handle: SessionHandle,
    playlist_actions: PlaylistActions,
    favorite_actions: FavoriteActions,
}

impl Repl {
    pub fn new(hymnal: Arc<Hymnal>, handle: SessionHandle, user_id: Option<UserId>) -> Self {
        let favorites = Arc::new(MemoryFavorites::new(Arc::clone(&hymnal)));
        Self {
            playlist_actions: PlaylistActions::new(hymnal.clone(), handle.clone()),
            favorite_actions: FavoriteActions::new(favorites, handle.clone(), user_id),
            hymnal,
            handle,
        }
    }

    /// Read commands until `quit` or end of input
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let reply = match ReplCommand::parse(&line) {
                Ok(None) => continue,
                Ok(Some(ReplCommand::Quit)) => break,
                Ok(Some(command)) => match self.execute(command).await {
                    Ok(text) => text,
                    Err(e) => format!("error: {}", e),
                },
                Err(e) => format!("error: {} (try \"help\")", e),
            };

            if !reply.is_empty() {
                output.write_all(reply.as_bytes()).await?;
                if !reply.ends_with('\n') {
                    output.write_all(b"\n").await?;
                }
                output.flush().await?;
            }
        }

        Ok(())
    }

    /// Run one command and return the text to show
    pub async fn execute(&self, command: ReplCommand) -> Result<String> {
        debug!("Console command: {:?}", command);

        match command {
            ReplCommand::Play(id) => {
                let track = self.hymn(&id)?;
                self.apply(|h| h.play(track, None)).await
            }
            ReplCommand::Album { id, start } => {
                let album = AlbumId::new(id);
                let tracks = self.hymnal.album_tracks(&album)?;
                self.apply(|h| h.play_collection(tracks, start, PlaybackContext::Album(album)))
                    .await
            }
            ReplCommand::Playlist { id, start } => {
                let playlist = PlaylistId::new(id);
                let tracks = self.hymnal.get_playlist_tracks(&playlist).await?;
                if tracks.is_empty() {
                    return Ok(format!("Playlist {} is empty", playlist));
                }
                self.apply(|h| {
                    h.play_collection(tracks, start, PlaybackContext::Playlist(playlist))
                })
                .await
            }
            ReplCommand::Pause => self.apply(SessionHandle::pause).await,
            ReplCommand::Resume => self.apply(SessionHandle::resume).await,
            ReplCommand::Toggle => self.apply(SessionHandle::toggle_play_pause).await,
            ReplCommand::Stop => self.apply(SessionHandle::stop).await,
            ReplCommand::Next => self.apply(SessionHandle::next).await,
            ReplCommand::Previous => self.apply(SessionHandle::previous).await,
            ReplCommand::Seek(secs) => self.apply(|h| h.seek(secs)).await,
            ReplCommand::Volume(v) => self.apply(|h| h.set_volume(v)).await,
            ReplCommand::Repeat(Some(mode)) => self.apply(|h| h.set_repeat(mode)).await,
            ReplCommand::Repeat(None) => self.apply(SessionHandle::cycle_repeat).await,
            ReplCommand::Shuffle => self.apply(SessionHandle::toggle_shuffle).await,
            ReplCommand::Enqueue(id) => {
                let track = self.hymn(&id)?;
                self.apply_then_queue(|h| h.enqueue(track)).await
            }
            ReplCommand::PlayNext(id) => {
                let track = self.hymn(&id)?;
                self.apply_then_queue(|h| h.play_next(track)).await
            }
            ReplCommand::Clear => self.apply_then_queue(SessionHandle::clear_queue).await,
            ReplCommand::Remove(n) => self.apply_then_queue(|h| h.remove_from_queue(n)).await,
            ReplCommand::Move(from, to) => {
                self.apply_then_queue(|h| h.move_in_queue(from, to)).await
            }
            ReplCommand::Queue => Ok(QueuePanel::render(&self.handle.snapshot())),
            ReplCommand::Hymns => Ok(self.list_hymns()),
            ReplCommand::Albums => Ok(self.list_albums()),
            ReplCommand::Playlists => Ok(self.list_playlists().await),
            ReplCommand::Add { playlist, hymn } => {
                let track = self.hymn(&hymn)?;
                let playlist = PlaylistId::new(playlist);
                let snapshots = self.watch();
                self.playlist_actions.add_track(&playlist, track).await?;
                settle(snapshots).await;
                Ok(format!("Added {} to {}", hymn, playlist))
            }
            ReplCommand::Drop { playlist, hymn } => {
                let playlist = PlaylistId::new(playlist);
                let snapshots = self.watch();
                self.playlist_actions
                    .remove_track(&playlist, &TrackId::new(hymn.clone()))
                    .await?;
                settle(snapshots).await;
                Ok(format!("Removed {} from {}", hymn, playlist))
            }
            ReplCommand::Favorite => {
                let Some(track) = self.handle.snapshot().current_track else {
                    return Ok("Nothing playing".to_string());
                };
                let now_favorite = self.favorite_actions.toggle(&track).await?;
                Ok(if now_favorite {
                    format!("Added \"{}\" to favorites", track.title())
                } else {
                    format!("Removed \"{}\" from favorites", track.title())
                })
            }
            ReplCommand::Status => Ok(MiniPlayer::render(&self.handle.snapshot())),
            ReplCommand::Full => {
                let snapshot = self.handle.snapshot();
                let favorite = self.is_favorite(&snapshot).await?;
                Ok(FullPlayer::render(&snapshot, favorite))
            }
            ReplCommand::Json => Ok(serde_json::to_string_pretty(&self.handle.snapshot())?),
            ReplCommand::Offline(offline) => {
                self.hymnal.set_offline(offline);
                Ok(format!("Catalog {}", if offline { "offline" } else { "online" }))
            }
            ReplCommand::Help => Ok(HELP.to_string()),
            ReplCommand::Quit => Ok(String::new()),
        }
    }

    fn hymn(&self, id: &str) -> Result<hymn_core::Track> {
        self.hymnal
            .track(id)
            .ok_or_else(|| PlayerError::invalid_command(format!("no hymn {:?}", id)))
    }

    async fn is_favorite(&self, snapshot: &SessionSnapshot) -> Result<bool> {
        match &snapshot.current_track {
            Some(track) => Ok(self.favorite_actions.is_favorite(track.id()).await?),
            None => Ok(false),
        }
    }

    /// Send a command and show the mini-player once the driver has applied it
    async fn apply<F>(&self, send: F) -> Result<String>
    where
        F: FnOnce(&SessionHandle) -> hymn_playback::Result<()>,
    {
        let snapshots = self.watch();
        send(&self.handle)?;
        settle(snapshots).await;
        Ok(MiniPlayer::render(&self.handle.snapshot()))
    }

    async fn apply_then_queue<F>(&self, send: F) -> Result<String>
    where
        F: FnOnce(&SessionHandle) -> hymn_playback::Result<()>,
    {
        let snapshots = self.watch();
        send(&self.handle)?;
        settle(snapshots).await;
        Ok(QueuePanel::render(&self.handle.snapshot()))
    }

    /// Snapshot receiver with the current value marked as seen
    fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        let mut snapshots = self.handle.watch();
        drop(snapshots.borrow_and_update());
        snapshots
    }

    fn list_hymns(&self) -> String {
        let mut out = String::new();
        for track in self.hymnal.tracks() {
            let _ = writeln!(
                out,
                "{:<22} {} - {} ({})",
                track.id(),
                track.title(),
                track.artist(),
                track.duration_label()
            );
        }
        out
    }

    fn list_albums(&self) -> String {
        let mut out = String::new();
        for album in self.hymnal.albums() {
            let _ = writeln!(out, "{:<22} {} ({} hymns)", album.id, album.title, album.track_count);
        }
        out
    }

    async fn list_playlists(&self) -> String {
        let mut out = String::new();
        for playlist in self.hymnal.playlists().await {
            let _ = writeln!(
                out,
                "{:<22} {} ({} hymns)",
                playlist.id, playlist.title, playlist.track_count
            );
        }
        out
    }
}

/// Wait for the driver's next snapshot publication
async fn settle(mut snapshots: watch::Receiver<SessionSnapshot>) {
    // A timeout only means nothing was published in time; the snapshot read
    // afterwards is still valid
    let _ = timeout(PUBLISH_WAIT, snapshots.changed()).await;
}
