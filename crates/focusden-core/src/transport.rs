//! Broadcast transport seam.
//!
//! The external real-time platform is consumed through this trait:
//! best-effort, unordered, possibly-duplicating datagram broadcast plus
//! room membership events. The matchbox adapter in `focusden-client`
//! implements it for WebRTC data channels; tests use the in-memory
//! loopback from `test_utils`.

use crate::participant::ParticipantId;
use crate::protocol::Topic;

/// Connection lifecycle of the local client.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransportError {
    #[error("not connected to the room yet")]
    NotConnected,
}

/// Something the transport observed since the last poll.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    StateChanged(ConnectionState),
    PeerConnected(ParticipantId),
    PeerDisconnected(ParticipantId),
    /// An inbound datagram, in local receipt order. No ordering holds
    /// across senders or topics, and duplicates are possible.
    Message {
        from: ParticipantId,
        topic: Topic,
        payload: Vec<u8>,
    },
}

/// Unordered best-effort broadcast to everyone else in the room.
pub trait BroadcastTransport {
    fn connection_state(&self) -> ConnectionState;

    /// The identity the room assigned to this client, once connected.
    fn local_id(&self) -> Option<ParticipantId>;

    /// Fire-and-forget broadcast on a topic. Delivery is unconfirmed;
    /// the only observable failure is not being connected yet.
    fn publish(&mut self, topic: Topic, payload: &[u8]) -> Result<(), TransportError>;

    /// Drain everything observed since the last poll, in receipt order.
    fn poll_events(&mut self) -> Vec<TransportEvent>;
}
