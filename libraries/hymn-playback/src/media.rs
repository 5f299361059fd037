//! Media element abstraction
//!
//! The real audio element (browser `<audio>`, native player, ...) is a black
//! box. The session mirrors its own state into it through this trait and
//! never reads anything back; media-side events come in through
//! `Session::set_duration` and `Session::report_media_error`.

/// Platform media element
///
/// Methods are infallible from the session's point of view. A backend that
/// fails to load a resource reports it asynchronously via
/// `Session::report_media_error`.
pub trait MediaElement: Send {
    /// Point the element at a new resource
    fn load(&mut self, url: &str);

    /// Start or resume output
    fn play(&mut self);

    /// Pause output, keeping the resource loaded
    fn pause(&mut self);

    /// Jump to a position in seconds
    fn seek(&mut self, position: f64);

    /// Set output volume in [0, 1]
    fn set_volume(&mut self, volume: f64);

    /// Unload the resource
    fn stop(&mut self);
}

/// Media element that does nothing
///
/// Used when the session runs headless (tests, simulated playback).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMedia;

impl MediaElement for NullMedia {
    fn load(&mut self, _url: &str) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _position: f64) {}
    fn set_volume(&mut self, _volume: f64) {}
    fn stop(&mut self) {}
}
