//! Lobby session configuration.

/// Configuration for a lobby session.
#[derive(Clone, Debug)]
pub struct LobbyConfig {
    /// Pomodoro work phase duration in seconds (default: 25 minutes)
    pub work_duration_secs: u32,
    /// Pomodoro break phase duration in seconds (default: 5 minutes)
    pub break_duration_secs: u32,
    /// Default countdown duration in seconds (default: 10 minutes)
    pub countdown_duration_secs: u32,
    /// How long local player events are suppressed after applying a
    /// remote video command, in milliseconds (default: 200).
    ///
    /// Tunable: the right value depends on the embedded player's
    /// event latency. Too short re-broadcasts remote applies, too long
    /// swallows genuine local input.
    pub remote_guard_window_ms: f64,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            work_duration_secs: 25 * 60,
            break_duration_secs: 5 * 60,
            countdown_duration_secs: 10 * 60,
            remote_guard_window_ms: 200.0,
        }
    }
}
