//! Chat log with order-independent append.
//!
//! Messages arrive over an unordered channel, possibly duplicated.
//! The log deduplicates on the full (timestamp, sender, message) triple
//! and derives display order by timestamp rather than arrival order.
//! Lost messages are not recovered; there is no retransmission.

use serde::{Deserialize, Serialize};

/// Maximum chat message length in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// A single chat message as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
    /// Sender's local clock, epoch milliseconds.
    pub timestamp: i64,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    Empty,

    #[error("message exceeds {MAX_MESSAGE_CHARS} characters ({0})")]
    TooLong(usize),
}

/// Validate and stamp an outgoing message.
pub fn compose(sender: &str, text: &str, now_ms: i64) -> Result<ChatMessage, ChatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ChatError::Empty);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ChatError::TooLong(chars));
    }
    Ok(ChatMessage {
        sender: sender.to_string(),
        message: trimmed.to_string(),
        timestamp: now_ms,
    })
}

/// Append-only chat log for one lobby session.
#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    entries: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unless an identical triple is already present.
    /// Returns true if the message was added.
    pub fn append(&mut self, msg: ChatMessage) -> bool {
        if self.entries.contains(&msg) {
            return false;
        }
        self.entries.push(msg);
        true
    }

    /// Messages in display order: ascending timestamp. The sort is
    /// stable, so same-timestamp messages keep their arrival order.
    pub fn ordered(&self) -> Vec<&ChatMessage> {
        let mut out: Vec<&ChatMessage> = self.entries.iter().collect();
        out.sort_by_key(|m| m.timestamp);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, text: &str, ts: i64) -> ChatMessage {
        ChatMessage {
            sender: sender.to_string(),
            message: text.to_string(),
            timestamp: ts,
        }
    }

    #[test]
    fn test_compose_trims_and_stamps() {
        let m = compose("ana", "  hello  ", 1700000000000).unwrap();
        assert_eq!(m.message, "hello");
        assert_eq!(m.sender, "ana");
        assert_eq!(m.timestamp, 1700000000000);
    }

    #[test]
    fn test_compose_rejects_empty() {
        assert_eq!(compose("ana", "   ", 0), Err(ChatError::Empty));
    }

    #[test]
    fn test_compose_rejects_too_long() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            compose("ana", &long, 0),
            Err(ChatError::TooLong(MAX_MESSAGE_CHARS + 1))
        );
        // Exactly at the limit is fine.
        let max = "x".repeat(MAX_MESSAGE_CHARS);
        assert!(compose("ana", &max, 0).is_ok());
    }

    #[test]
    fn test_duplicate_append_is_idempotent() {
        let mut log = ChatLog::new();
        let m = msg("ana", "hi", 10);
        assert!(log.append(m.clone()));
        let before = log.ordered().into_iter().cloned().collect::<Vec<_>>();
        assert!(!log.append(m));
        let after = log.ordered().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_triple_must_match_exactly_to_dedup() {
        let mut log = ChatLog::new();
        assert!(log.append(msg("ana", "hi", 10)));
        // Same text and time from a different sender is a new message.
        assert!(log.append(msg("bo", "hi", 10)));
        // Same sender and text at a different time is a new message.
        assert!(log.append(msg("ana", "hi", 11)));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_ordered_sorts_by_timestamp_not_arrival() {
        let mut log = ChatLog::new();
        log.append(msg("ana", "second", 20));
        log.append(msg("bo", "first", 10));
        log.append(msg("cy", "third", 30));

        let texts: Vec<_> = log.ordered().iter().map(|m| m.message.clone()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
