//! Matchbox-backed lobby transport.
//!
//! One WebRTC data channel per logical topic: presence rides a
//! reliable channel (membership metadata must arrive), while chat,
//! video, and timer ride unreliable unordered channels matching the
//! protocol's delivery assumptions.

use matchbox_socket::{
    ChannelConfig, MessageLoopFuture, PeerId, PeerState, WebRtcSocket, WebRtcSocketBuilder,
};

use focusden_core::{
    BroadcastTransport, ConnectionState, ParticipantId, Topic, TransportError, TransportEvent,
};

/// Topic of each data channel, in channel-index order.
const CHANNEL_TOPICS: [Topic; 4] = [Topic::Presence, Topic::Chat, Topic::Video, Topic::Timer];

fn channel_index(topic: Topic) -> usize {
    match topic {
        Topic::Presence => 0,
        Topic::Chat => 1,
        Topic::Video => 2,
        Topic::Timer => 3,
    }
}

fn participant(peer: PeerId) -> ParticipantId {
    ParticipantId(peer.0)
}

/// Lobby transport over a matchbox WebRTC socket.
pub struct LobbySocket {
    socket: WebRtcSocket,
    state: ConnectionState,
    /// Cached copy of the id the room assigned us. `WebRtcSocket::id`
    /// needs `&mut self`; caching lets `local_id` read it through `&self`.
    local_id: Option<ParticipantId>,
}

impl LobbySocket {
    /// Open a socket against the signaling server's room URL, e.g.
    /// `ws://localhost:3000/signaling/my-room`.
    ///
    /// The returned future is the socket's message loop; the caller
    /// must drive it (`spawn_local` on wasm, `tokio::spawn` natively)
    /// and call [`LobbySocket::mark_closed`] when it resolves.
    pub fn connect(room_url: &str) -> (Self, MessageLoopFuture) {
        tracing::info!(url = %room_url, "connecting to lobby room");
        let (socket, loop_fut) = WebRtcSocketBuilder::new(room_url)
            .add_channel(ChannelConfig::reliable())
            .add_channel(ChannelConfig::unreliable())
            .add_channel(ChannelConfig::unreliable())
            .add_channel(ChannelConfig::unreliable())
            .build();

        let transport = Self {
            socket,
            state: ConnectionState::Connecting,
            local_id: None,
        };
        (transport, loop_fut)
    }

    /// Tell the transport its message loop has ended (connection lost
    /// or room left).
    pub fn mark_closed(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    fn refresh_state(&mut self, events: &mut Vec<TransportEvent>) {
        if self.state == ConnectionState::Connecting {
            if let Some(id) = self.socket.id() {
                self.local_id = Some(participant(id));
                self.state = ConnectionState::Connected;
                events.push(TransportEvent::StateChanged(ConnectionState::Connected));
            }
        }
    }
}

impl BroadcastTransport for LobbySocket {
    fn connection_state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn local_id(&self) -> Option<ParticipantId> {
        self.local_id
    }

    fn publish(&mut self, topic: Topic, payload: &[u8]) -> Result<(), TransportError> {
        if self.socket.id().is_none() || self.state != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }

        let peers: Vec<PeerId> = self.socket.connected_peers().collect();
        let channel = self.socket.channel_mut(channel_index(topic));
        for peer in peers {
            channel.send(payload.to_vec().into(), peer);
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if self.state == ConnectionState::Disconnected {
            return events;
        }

        self.refresh_state(&mut events);

        for (peer, peer_state) in self.socket.update_peers() {
            match peer_state {
                PeerState::Connected => {
                    events.push(TransportEvent::PeerConnected(participant(peer)));
                }
                PeerState::Disconnected => {
                    events.push(TransportEvent::PeerDisconnected(participant(peer)));
                }
            }
        }

        for (index, topic) in CHANNEL_TOPICS.iter().enumerate() {
            for (peer, packet) in self.socket.channel_mut(index).receive() {
                events.push(TransportEvent::Message {
                    from: participant(peer),
                    topic: *topic,
                    payload: packet.to_vec(),
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_topic_has_a_channel() {
        for topic in Topic::ALL {
            assert_eq!(CHANNEL_TOPICS[channel_index(topic)], topic);
        }
    }

    #[test]
    fn test_publish_before_connect_is_rejected() {
        let (mut socket, _loop_fut) = LobbySocket::connect("ws://localhost:3000/signaling/test");
        assert_eq!(socket.connection_state(), ConnectionState::Connecting);
        assert_eq!(
            socket.publish(Topic::Chat, b"{}"),
            Err(TransportError::NotConnected)
        );
    }

    #[test]
    fn test_closed_socket_emits_no_events() {
        let (mut socket, _loop_fut) = LobbySocket::connect("ws://localhost:3000/signaling/test");
        socket.mark_closed();
        assert!(socket.poll_events().is_empty());
        assert_eq!(socket.connection_state(), ConnectionState::Disconnected);
    }
}
