//! Lobby session: one room's shared state and the wiring around it.
//!
//! The session owns the membership roster, the three reducers, the
//! transport, and the local media player. UI input comes in through the
//! dispatcher methods (authority-checked), transport traffic through
//! [`LobbySession::poll`]. All clocks are passed in as epoch
//! milliseconds; the session never reads wall time itself.

use crate::authority;
use crate::chat::{self, ChatError, ChatLog, ChatMessage};
use crate::config::LobbyConfig;
use crate::participant::{Participant, ParticipantId, RoomRoster};
use crate::player::{MediaPlayer, PlayerEvent};
use crate::protocol::{self, PresencePayload, Topic};
use crate::timer::{TimerMode, TimerReducer, TimerState};
use crate::transport::{BroadcastTransport, ConnectionState, TransportError, TransportEvent};
use crate::video::{VideoCommand, VideoReducer, VideoState, VideoUrlError};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("not connected to the room yet")]
    NotConnected,

    #[error("only the lobby host can do this")]
    NotAuthority,

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    VideoUrl(#[from] VideoUrlError),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => SessionError::NotConnected,
        }
    }
}

/// Per-room session context. Created on room entry, dropped on leave.
pub struct LobbySession<T: BroadcastTransport, P: MediaPlayer> {
    config: LobbyConfig,
    display_name: String,
    connection: ConnectionState,
    roster: RoomRoster,
    join_order: Option<u32>,
    timer: TimerReducer,
    video: VideoReducer,
    chat: ChatLog,
    transport: T,
    player: P,
}

impl<T: BroadcastTransport, P: MediaPlayer> LobbySession<T, P> {
    pub fn new(transport: T, player: P, display_name: &str, config: LobbyConfig) -> Self {
        Self {
            timer: TimerReducer::new(&config),
            video: VideoReducer::new(config.remote_guard_window_ms),
            chat: ChatLog::new(),
            roster: RoomRoster::new(),
            join_order: None,
            connection: ConnectionState::Disconnected,
            display_name: display_name.to_string(),
            transport,
            player,
            config,
        }
    }

    // === State queries ===

    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn is_authority(&self) -> bool {
        authority::is_authority(&self.roster)
    }

    pub fn authority(&self) -> Option<ParticipantId> {
        authority::authority_of(&self.roster)
    }

    pub fn local_id(&self) -> Option<ParticipantId> {
        self.roster.local_id()
    }

    /// Participants ordered by join order.
    pub fn participants(&self) -> Vec<&Participant> {
        self.roster.ordered()
    }

    pub fn timer_state(&self) -> &TimerState {
        self.timer.state()
    }

    pub fn video_state(&self) -> &VideoState {
        self.video.state()
    }

    /// Chat messages in display order (ascending timestamp).
    pub fn chat_messages(&self) -> Vec<&ChatMessage> {
        self.chat.ordered()
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // === Transport pump ===

    /// Drain transport events and apply them. Call once per UI frame.
    pub fn poll(&mut self, now_ms: f64) {
        for event in self.transport.poll_events() {
            self.handle_event(event, now_ms);
        }
    }

    fn handle_event(&mut self, event: TransportEvent, now_ms: f64) {
        match event {
            TransportEvent::StateChanged(state) => self.handle_state_change(state),
            TransportEvent::PeerConnected(id) => self.handle_peer_connected(id),
            TransportEvent::PeerDisconnected(id) => self.handle_peer_disconnected(id),
            TransportEvent::Message {
                from,
                topic,
                payload,
            } => self.handle_inbound(from, topic, &payload, now_ms),
        }
    }

    fn handle_state_change(&mut self, state: ConnectionState) {
        tracing::debug!(state = ?state, "connection state changed");
        match &state {
            ConnectionState::Connected => {
                if let Some(id) = self.transport.local_id() {
                    // Our join-order claim: how many peers we saw in the
                    // room before the platform let us in.
                    let claim = self.roster.len() as u32;
                    self.join_order = Some(claim);
                    self.roster.local_joined(id, &self.display_name, claim);
                    self.broadcast_presence();
                }
            }
            ConnectionState::Disconnected | ConnectionState::Error(_) => {
                self.roster.clear();
                self.join_order = None;
            }
            ConnectionState::Connecting => {}
        }
        self.connection = state;
    }

    fn handle_peer_connected(&mut self, id: ParticipantId) {
        if self.roster.add_peer(id) {
            tracing::debug!(peer = %id.short(), "peer joined");
        }
        if self.roster.local_id().is_some() {
            self.broadcast_presence();
            if self.is_authority() {
                // Catch the newcomer up without waiting for the next
                // natural transition.
                self.broadcast_timer();
                self.broadcast_video_catchup();
            }
        }
    }

    fn handle_peer_disconnected(&mut self, id: ParticipantId) {
        let was_authority = self.is_authority();
        self.roster.remove_peer(id);
        tracing::debug!(peer = %id.short(), "peer left");

        if !was_authority && self.is_authority() {
            tracing::debug!("local client became the lobby host");
            self.broadcast_timer();
        }
    }

    fn handle_inbound(&mut self, from: ParticipantId, topic: Topic, payload: &[u8], now_ms: f64) {
        match topic {
            Topic::Presence => match protocol::decode::<PresencePayload>(payload) {
                Ok(p) => {
                    self.roster.add_peer(from);
                    self.roster.announce(from, &p.display_name, p.join_order);
                }
                Err(e) => drop_malformed(topic, &e),
            },
            Topic::Chat => match protocol::decode::<ChatMessage>(payload) {
                Ok(msg) => {
                    if !self.chat.append(msg) {
                        tracing::trace!("duplicate chat message dropped");
                    }
                }
                Err(e) => drop_malformed(topic, &e),
            },
            Topic::Video => match protocol::decode::<VideoCommand>(payload) {
                Ok(cmd) => {
                    self.video.apply_remote(&cmd, now_ms, &mut self.player);
                }
                Err(e) => drop_malformed(topic, &e),
            },
            Topic::Timer => match protocol::decode::<TimerState>(payload) {
                Ok(state) => {
                    if self.is_authority() {
                        // We are the source of truth; a stale broadcast
                        // from a departed host must not overwrite us.
                        tracing::trace!("ignoring timer broadcast while authoritative");
                    } else {
                        self.timer.apply_remote(state);
                    }
                }
                Err(e) => drop_malformed(topic, &e),
            },
        }
    }

    // === Timer dispatchers (authority-gated) ===

    pub fn toggle_timer(&mut self) -> Result<(), SessionError> {
        self.ensure_authority()?;
        self.timer.toggle_running();
        self.publish_timer()
    }

    /// Advance the shared timer by one second. Drive this at 1 Hz while
    /// the UI is mounted; it is a silent no-op on non-authority clients.
    pub fn tick_timer(&mut self) -> Result<(), SessionError> {
        if !self.is_authority() {
            return Ok(());
        }
        self.timer.tick();
        self.publish_timer()
    }

    pub fn switch_timer_mode(&mut self, mode: TimerMode) -> Result<(), SessionError> {
        self.ensure_authority()?;
        self.timer.switch_mode(mode);
        self.publish_timer()
    }

    pub fn reset_timer(&mut self) -> Result<(), SessionError> {
        self.ensure_authority()?;
        self.timer.reset();
        self.publish_timer()
    }

    pub fn set_countdown_duration(&mut self, secs: u32) -> Result<(), SessionError> {
        self.ensure_authority()?;
        self.timer.set_countdown_duration(secs);
        self.publish_timer()
    }

    // === Video dispatchers (authority-gated) ===

    pub fn play_video(&mut self) -> Result<(), SessionError> {
        self.ensure_authority()?;
        let cmd = self.video.play(self.player.current_time());
        self.player.play();
        self.publish_video(&cmd)
    }

    pub fn pause_video(&mut self) -> Result<(), SessionError> {
        self.ensure_authority()?;
        let cmd = self.video.pause(self.player.current_time());
        self.player.pause();
        self.publish_video(&cmd)
    }

    pub fn seek_video(&mut self, position: f64) -> Result<(), SessionError> {
        self.ensure_authority()?;
        let cmd = self.video.seek(position);
        self.player.seek_to(position);
        self.publish_video(&cmd)
    }

    /// Validate a pasted URL or id and share the video with the room.
    pub fn share_video(&mut self, url: &str) -> Result<(), SessionError> {
        self.ensure_authority()?;
        let cmd = self.video.new_video(url)?;
        if let VideoCommand::NewVideo { video_id } = &cmd {
            self.player.load_video(video_id);
        }
        self.publish_video(&cmd)
    }

    /// Feed a state-change signal from the local player through the
    /// session. Echoes of remote applies are swallowed by the guard;
    /// anything else is broadcast only when this client is the
    /// authority.
    pub fn player_event(&mut self, event: PlayerEvent, now_ms: f64) -> Result<(), SessionError> {
        let Some(cmd) = self.video.local_player_event(event, now_ms) else {
            return Ok(());
        };
        if !self.is_authority() {
            // Manual interference on a mirror; the next authoritative
            // broadcast overwrites it.
            return Ok(());
        }
        self.publish_video(&cmd)
    }

    // === Chat (no authority restriction) ===

    /// Validate, optimistically append, and broadcast a chat message.
    pub fn send_chat(&mut self, text: &str, now_ms: f64) -> Result<(), SessionError> {
        self.ensure_connected()?;
        let msg = chat::compose(&self.display_name, text, now_ms as i64)?;
        self.transport
            .publish(Topic::Chat, &protocol::encode(&msg))?;
        self.chat.append(msg);
        Ok(())
    }

    // === Internals ===

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.connection == ConnectionState::Connected {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    fn ensure_authority(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        if self.is_authority() {
            Ok(())
        } else {
            Err(SessionError::NotAuthority)
        }
    }

    fn publish_timer(&mut self) -> Result<(), SessionError> {
        let bytes = protocol::encode(self.timer.state());
        self.transport.publish(Topic::Timer, &bytes)?;
        Ok(())
    }

    fn publish_video(&mut self, cmd: &VideoCommand) -> Result<(), SessionError> {
        self.transport
            .publish(Topic::Video, &protocol::encode(cmd))?;
        Ok(())
    }

    /// Best-effort broadcasts driven by membership changes rather than
    /// user input; failures are logged, not surfaced.
    fn broadcast_presence(&mut self) {
        let Some(join_order) = self.join_order else {
            return;
        };
        let payload = PresencePayload {
            display_name: self.display_name.clone(),
            join_order,
        };
        if let Err(e) = self
            .transport
            .publish(Topic::Presence, &protocol::encode(&payload))
        {
            tracing::debug!(error = %e, "presence broadcast failed");
        }
    }

    fn broadcast_timer(&mut self) {
        if let Err(e) = self.publish_timer() {
            tracing::debug!(error = %e, "timer broadcast failed");
        }
    }

    /// Replay the current video state for a newly connected peer. Uses
    /// the player's live position so mirrors snap to where playback
    /// actually is.
    fn broadcast_video_catchup(&mut self) {
        let state = self.video.state();
        if state.current_video_id.is_empty() {
            return;
        }
        let position = self.player.current_time();
        let mut cmds = vec![
            VideoCommand::NewVideo {
                video_id: state.current_video_id.clone(),
            },
            VideoCommand::Seek {
                current_time: position,
            },
        ];
        cmds.push(if state.is_playing {
            VideoCommand::Play {
                current_time: position,
            }
        } else {
            VideoCommand::Pause {
                current_time: position,
            }
        });
        for cmd in cmds {
            if let Err(e) = self.publish_video(&cmd) {
                tracing::debug!(error = %e, "video catch-up broadcast failed");
                return;
            }
        }
    }
}

fn drop_malformed(topic: Topic, err: &serde_json::Error) {
    tracing::debug!(topic = %topic, error = %err, "dropping malformed payload");
}
