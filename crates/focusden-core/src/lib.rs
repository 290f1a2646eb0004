//! Focusden Lobby Core
//!
//! Shared-state synchronization for the focusden lobby: a single
//! host-elected-by-join-order drives the shared timer and video state
//! over an unordered best-effort broadcast channel, every other client
//! mirrors it, and chat is an order-independent deduplicated log.
//!
//! Transport and media player are consumed through traits; the
//! matchbox WebRTC adapter lives in `focusden-client`.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod authority;
pub mod chat;
pub mod config;
pub mod participant;
pub mod player;
pub mod protocol;
pub mod session;
pub mod test_utils;
pub mod timer;
pub mod transport;
pub mod video;

pub use authority::{authority_of, is_authority};
pub use chat::{ChatError, ChatLog, ChatMessage, MAX_MESSAGE_CHARS};
pub use config::LobbyConfig;
pub use participant::{Participant, ParticipantId, RoomRoster};
pub use player::{MediaPlayer, PlayerEvent};
pub use protocol::{PresencePayload, Topic};
pub use session::{LobbySession, SessionError};
pub use timer::{PomodoroPhase, TimerMode, TimerReducer, TimerState};
pub use transport::{BroadcastTransport, ConnectionState, TransportError, TransportEvent};
pub use video::{extract_video_id, VideoCommand, VideoReducer, VideoState, VideoUrlError};
