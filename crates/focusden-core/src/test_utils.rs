//! In-memory doubles for tests: a loopback transport and a scripted
//! media player.

use crate::participant::ParticipantId;
use crate::player::MediaPlayer;
use crate::protocol::Topic;
use crate::transport::{BroadcastTransport, ConnectionState, TransportError, TransportEvent};

/// Transport double: records outbound frames and replays scripted
/// inbound events on the next poll.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    state: ConnectionState,
    local: Option<ParticipantId>,
    published: Vec<(Topic, Vec<u8>)>,
    queue: Vec<TransportEvent>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the room assigning us an identity.
    pub fn connect_as(&mut self, id: ParticipantId) {
        self.state = ConnectionState::Connected;
        self.local = Some(id);
        self.queue
            .push(TransportEvent::StateChanged(ConnectionState::Connected));
    }

    pub fn drop_connection(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.local = None;
        self.queue
            .push(TransportEvent::StateChanged(ConnectionState::Disconnected));
    }

    pub fn peer_joins(&mut self, id: ParticipantId) {
        self.queue.push(TransportEvent::PeerConnected(id));
    }

    pub fn peer_leaves(&mut self, id: ParticipantId) {
        self.queue.push(TransportEvent::PeerDisconnected(id));
    }

    /// Script an inbound datagram.
    pub fn deliver(&mut self, from: ParticipantId, topic: Topic, payload: Vec<u8>) {
        self.queue.push(TransportEvent::Message {
            from,
            topic,
            payload,
        });
    }

    /// Everything published since the last call.
    pub fn take_published(&mut self) -> Vec<(Topic, Vec<u8>)> {
        std::mem::take(&mut self.published)
    }

    /// Outbound frames on one topic since the last `take_published`.
    pub fn published_on(&self, topic: Topic) -> Vec<&[u8]> {
        self.published
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, p)| p.as_slice())
            .collect()
    }
}

impl BroadcastTransport for LoopbackTransport {
    fn connection_state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn local_id(&self) -> Option<ParticipantId> {
        self.local
    }

    fn publish(&mut self, topic: Topic, payload: &[u8]) -> Result<(), TransportError> {
        if self.state != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        self.published.push((topic, payload.to_vec()));
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.queue)
    }
}

/// What a [`ScriptedPlayer`] was told to do.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerCall {
    Play,
    Pause,
    SeekTo(f64),
    Load(String),
}

/// Media player double: records control calls and reports a settable
/// position.
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    pub calls: Vec<PlayerCall>,
    pub position: f64,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaPlayer for ScriptedPlayer {
    fn play(&mut self) {
        self.calls.push(PlayerCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(PlayerCall::Pause);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.position = seconds;
        self.calls.push(PlayerCall::SeekTo(seconds));
    }

    fn load_video(&mut self, video_id: &str) {
        self.position = 0.0;
        self.calls.push(PlayerCall::Load(video_id.to_string()));
    }

    fn current_time(&self) -> f64 {
        self.position
    }
}
