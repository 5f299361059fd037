/// Headless media element
///
/// The terminal player has no audio output. This element only traces what a
/// real one would be told to do, which keeps the session's media calls
/// visible with `RUST_LOG=hymn_player=debug`.
use hymn_playback::MediaElement;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TracingMedia {
    source: Option<String>,
}

impl TracingMedia {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaElement for TracingMedia {
    fn load(&mut self, url: &str) {
        debug!("media: load {}", url);
        self.source = Some(url.to_string());
    }

    fn play(&mut self) {
        debug!("media: play {:?}", self.source);
    }

    fn pause(&mut self) {
        debug!("media: pause");
    }

    fn seek(&mut self, position: f64) {
        debug!("media: seek to {:.1}s", position);
    }

    fn set_volume(&mut self, volume: f64) {
        debug!("media: volume {:.2}", volume);
    }

    fn stop(&mut self) {
        debug!("media: stop");
        self.source = None;
    }
}
