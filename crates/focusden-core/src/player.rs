//! Local media player control surface.
//!
//! The lobby drives whatever player the embedding UI provides through
//! this trait, and hears back from it via [`PlayerEvent`].

/// Control surface of the local media player.
pub trait MediaPlayer {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn load_video(&mut self, video_id: &str);
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
}

/// A state-change signal emitted by the local player, regardless of
/// whether a human or a remote apply caused it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEvent {
    Played { position: f64 },
    Paused { position: f64 },
    Seeked { position: f64 },
}
