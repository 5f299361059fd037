/// Player configuration
use crate::error::{PlayerError, Result};
use hymn_core::UserId;
use hymn_playback::{RepeatMode, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hymn.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub user: UserSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// "off" (or "none"), "all" or "one"
    #[serde(default = "default_repeat")]
    pub repeat: String,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_near_completion")]
    pub near_completion: f64,

    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserSettings {
    /// Passed to the play-count recorder; anonymous when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Hymnal JSON file; the bundled hymnal is used when unset
    #[serde(default)]
    pub hymnal_path: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: default_playback(),
            user: UserSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `hymn.toml` if
    /// present. `HYMN_` environment variables override file values, with
    /// `__` between section and key (`HYMN_PLAYBACK__VOLUME=0.5`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("HYMN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| PlayerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| PlayerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if !(0.0..=1.0).contains(&playback.volume) {
            return Err(PlayerError::Config(format!(
                "volume must be between 0 and 1, got {}",
                playback.volume
            )));
        }

        if RepeatMode::from_str(&playback.repeat).is_none() {
            return Err(PlayerError::Config(format!(
                "repeat must be one of off, all, one (got {:?})",
                playback.repeat
            )));
        }

        if playback.tick_interval_ms == 0 {
            return Err(PlayerError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        if !(playback.near_completion > 0.0 && playback.near_completion <= 1.0) {
            return Err(PlayerError::Config(format!(
                "near_completion must be in (0, 1], got {}",
                playback.near_completion
            )));
        }

        if playback.event_capacity == 0 {
            return Err(PlayerError::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        if let Some(path) = &self.catalog.hymnal_path {
            if !path.exists() {
                return Err(PlayerError::Config(format!(
                    "Hymnal file not found at {:?}",
                    path
                )));
            }
        }

        Ok(())
    }

    /// Session settings for the playback driver
    pub fn session_config(&self) -> SessionConfig {
        let playback = &self.playback;
        SessionConfig {
            volume: playback.volume,
            repeat: RepeatMode::from_str(&playback.repeat).unwrap_or_default(),
            shuffle: playback.shuffle,
            tick_interval: Duration::from_millis(playback.tick_interval_ms),
            near_completion: playback.near_completion,
            shuffle_seed: playback.shuffle_seed,
            user_id: self.user.user_id.as_deref().map(UserId::new),
            event_capacity: playback.event_capacity,
        }
    }
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        repeat: default_repeat(),
        shuffle: false,
        tick_interval_ms: default_tick_interval_ms(),
        near_completion: default_near_completion(),
        shuffle_seed: None,
        event_capacity: default_event_capacity(),
    }
}

fn default_volume() -> f64 {
    0.8
}

fn default_repeat() -> String {
    "off".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_near_completion() -> f64 {
    0.995
}

fn default_event_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let config = PlayerConfig::default();
        config.validate().unwrap();

        let session = config.session_config();
        let expected = SessionConfig::default();
        assert_eq!(session.volume, expected.volume);
        assert_eq!(session.repeat, expected.repeat);
        assert_eq!(session.tick_interval, expected.tick_interval);
        assert_eq!(session.near_completion, expected.near_completion);
        assert_eq!(session.event_capacity, expected.event_capacity);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = PlayerConfig::default();
        config.playback.volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.playback.repeat = "twice".to_string();
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.playback.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn repeat_accepts_none_alias() {
        let mut config = PlayerConfig::default();
        config.playback.repeat = "none".to_string();
        config.validate().unwrap();
        assert_eq!(config.session_config().repeat, RepeatMode::Off);
    }
}
