/// Hymnal Player - terminal hymn player
use anyhow::Context;
use clap::{Parser, Subcommand};
use hymn_core::{AlbumId, PlaylistId, PlaylistStore, UserId};
use hymn_player::{
    catalog::{Hymnal, LoggingRecorder},
    config::PlayerConfig,
    media::TracingMedia,
    repl::{Repl, HELP},
    surfaces::MiniPlayer,
};
use hymn_playback::{
    NotificationLevel, PlaybackContext, PlaybackStatus, Session, SessionDriver, SessionEvent,
    SessionHandle,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hymn-player")]
#[command(about = "Hymnal Player terminal front end", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./hymn.toml when present)
    #[arg(short, long, global = true, env = "HYMN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an album or playlist and follow it in the mini-player
    Play {
        /// Album to play
        #[arg(long, conflicts_with = "playlist")]
        album: Option<String>,
        /// Playlist to play
        #[arg(long)]
        playlist: Option<String>,
        /// Index of the first hymn
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Stop after this many seconds
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Interactive console reading commands from stdin
    Repl,
    /// List hymns, albums and playlists
    Hymns,
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hymn_player=info,hymn_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Play {
            album,
            playlist,
            start,
            limit,
        } => {
            play(&config, album, playlist, start, limit).await?;
        }
        Commands::Repl => {
            repl(&config).await?;
        }
        Commands::Hymns => {
            list_hymns(&config).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_hymnal(config: &PlayerConfig) -> anyhow::Result<Arc<Hymnal>> {
    let hymnal = match &config.catalog.hymnal_path {
        Some(path) => Hymnal::load(path)
            .with_context(|| format!("Failed to load hymnal from {}", path.display()))?,
        None => Hymnal::bundled()?,
    };
    Ok(Arc::new(hymnal))
}

fn start_session(
    config: &PlayerConfig,
    hymnal: &Arc<Hymnal>,
) -> (JoinHandle<Session>, SessionHandle) {
    let recorder = Arc::new(LoggingRecorder::new(Arc::clone(hymnal)));
    let (driver, handle) = SessionDriver::new(
        config.session_config(),
        Box::new(TracingMedia::new()),
        Some(recorder),
    );
    (driver.spawn(), handle)
}

async fn play(
    config: &PlayerConfig,
    album: Option<String>,
    playlist: Option<String>,
    start: usize,
    limit: Option<u64>,
) -> anyhow::Result<()> {
    let hymnal = load_hymnal(config)?;

    let (tracks, context) = match (album, playlist) {
        (_, Some(id)) => {
            let id = PlaylistId::new(id);
            (
                hymnal.get_playlist_tracks(&id).await?,
                PlaybackContext::Playlist(id),
            )
        }
        (Some(id), None) => {
            let id = AlbumId::new(id);
            (hymnal.album_tracks(&id)?, PlaybackContext::Album(id))
        }
        (None, None) => {
            let first = hymnal
                .albums()
                .into_iter()
                .next()
                .context("The hymnal has no albums")?;
            let id = AlbumId::new(first.id);
            (hymnal.album_tracks(&id)?, PlaybackContext::Album(id))
        }
    };
    anyhow::ensure!(!tracks.is_empty(), "Nothing to play");

    let (task, handle) = start_session(config, &hymnal);
    let printer = tokio::spawn(print_events(handle.subscribe()));
    let mut snapshots = handle.watch();

    handle.play_collection(tracks, start, context)?;

    let deadline = async {
        match limit {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!("{}", MiniPlayer::render(&snapshot));
                if snapshot.status == PlaybackStatus::Stopped && snapshot.current_track.is_none() {
                    info!("Reached the end of the queue");
                    break;
                }
            }
            () = &mut deadline => {
                info!("Time limit reached");
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping");
                break;
            }
        }
    }

    finish(task, handle).await?;
    printer.abort();
    Ok(())
}

async fn repl(config: &PlayerConfig) -> anyhow::Result<()> {
    let hymnal = load_hymnal(config)?;
    let (task, handle) = start_session(config, &hymnal);
    let printer = tokio::spawn(print_events(handle.subscribe()));

    println!("Hymnal Player console. Type \"help\" for commands.");
    println!("{}", HELP);

    let user_id = config.user.user_id.as_deref().map(UserId::new);
    let console = Repl::new(Arc::clone(&hymnal), handle.clone(), user_id);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    console.run(stdin, &mut stdout).await?;

    finish(task, handle).await?;
    printer.abort();
    Ok(())
}

async fn list_hymns(config: &PlayerConfig) -> anyhow::Result<()> {
    let hymnal = load_hymnal(config)?;

    println!("Hymns:");
    for track in hymnal.tracks() {
        println!("  {} - {} ({})", track.id(), track.title(), track.duration_label());
    }

    println!("Albums:");
    for album in hymnal.albums() {
        println!("  {} - {} ({} hymns)", album.id, album.title, album.track_count);
    }

    println!("Playlists:");
    for playlist in hymnal.playlists().await {
        println!(
            "  {} - {} ({} hymns)",
            playlist.id, playlist.title, playlist.track_count
        );
    }

    Ok(())
}

/// Shut the driver down and log the final state
async fn finish(task: JoinHandle<Session>, handle: SessionHandle) -> anyhow::Result<()> {
    // Already gone is fine, the join below reports why
    let _ = handle.shutdown();
    let session = task.await.context("Playback session task failed")?;
    info!("Session closed: {:?}", session);
    Ok(())
}

/// Print notifications and track changes as they happen
async fn print_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Notification(notification)) => {
                let prefix = match notification.level {
                    NotificationLevel::Info => "i",
                    NotificationLevel::Warning => "!",
                    NotificationLevel::Error => "x",
                };
                eprintln!("[{}] {}", prefix, notification.message);
            }
            Ok(SessionEvent::TrackChanged {
                track_id,
                auto_advanced: true,
                ..
            }) => {
                eprintln!("[i] Continuing with {}", track_id);
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event printer lagged, {} events skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
