//! Logical topics and wire encoding.
//!
//! Every payload is topic-scoped JSON carried as an opaque datagram.
//! The timer topic carries [`crate::timer::TimerState`], video carries
//! [`crate::video::VideoCommand`], chat carries
//! [`crate::chat::ChatMessage`], and presence carries [`PresencePayload`].

use serde::{Deserialize, Serialize};

/// A named logical channel multiplexed over the datagram transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Display name / join order announcements.
    Presence,
    /// Chat messages; no authority restriction.
    Chat,
    /// Video playback commands from the authority.
    Video,
    /// Full timer state broadcasts from the authority.
    Timer,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Presence, Topic::Chat, Topic::Video, Topic::Timer];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Presence => "presence",
            Topic::Chat => "chat",
            Topic::Video => "video",
            Topic::Timer => "timer",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Announcement of who a participant is, sent whenever membership
/// changes so late joiners and reconnects converge on the same view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub display_name: String,
    /// How many others the sender saw in the room when it joined.
    pub join_order: u32,
}

/// Serialize a payload for the wire.
///
/// Payload types in this crate cannot fail JSON serialization, so this
/// is infallible for callers.
pub fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

/// Parse an inbound payload. Callers drop the message on error.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;

    #[test]
    fn test_chat_wire_format() {
        let msg = ChatMessage {
            sender: "ana".to_string(),
            message: "hello".to_string(),
            timestamp: 1700000000000,
        };
        let bytes = encode(&msg);
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["sender"], "ana");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["timestamp"], 1700000000000i64);

        let back: ChatMessage = decode(&bytes).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_presence_wire_format() {
        let p = PresencePayload {
            display_name: "ana".to_string(),
            join_order: 2,
        };
        let json: serde_json::Value = serde_json::from_slice(&encode(&p)).unwrap();
        assert_eq!(json["displayName"], "ana");
        assert_eq!(json["joinOrder"], 2);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode::<PresencePayload>(b"not json").is_err());
        assert!(decode::<PresencePayload>(b"{\"displayName\":42}").is_err());
    }
}
