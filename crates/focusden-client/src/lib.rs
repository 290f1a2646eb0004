//! Focusden lobby client adapter.
//!
//! Binds the transport seam of `focusden-core` to a matchbox WebRTC
//! socket. The embedding UI creates a [`LobbySocket`], hands it to a
//! `LobbySession`, drives the returned message-loop future, and polls
//! the session once per frame.

use chrono::Utc;

pub mod socket;

pub use socket::LobbySocket;

/// The local wall clock in epoch milliseconds, for session `now_ms`
/// parameters and chat timestamps.
pub fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}
