//! Shared video playback state machine.
//!
//! The authority's play/pause/seek/new-video actions are broadcast as
//! commands; every other client snaps its local player to them. A
//! short-lived guard marks "this player change came from a remote
//! apply" so the player's own echo of that change is not re-broadcast.

use serde::{Deserialize, Serialize};

use crate::player::{MediaPlayer, PlayerEvent};

/// Expected length of a video identifier.
const VIDEO_ID_LEN: usize = 11;

/// Shared playback state mirrored by every participant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoState {
    pub current_video_id: String,
    /// Position at the last local or remote state change; the player
    /// advances on its own between sync events.
    pub last_known_position_seconds: f64,
    pub is_playing: bool,
}

/// A video command as it travels on the wire, tagged by action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VideoCommand {
    Play {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    Pause {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    Seek {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    NewVideo {
        #[serde(rename = "videoId")]
        video_id: String,
    },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VideoUrlError {
    #[error("no video id found in '{0}'")]
    NoMatch(String),
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Take a video id from the head of `s` if one is there.
fn take_id(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() < VIDEO_ID_LEN || !bytes[..VIDEO_ID_LEN].iter().copied().all(is_id_byte) {
        return None;
    }
    // An id must end at the string, or at a URL delimiter; a longer
    // run of id characters is something else. Id bytes are ASCII, so
    // the slice below is on a character boundary.
    match bytes.get(VIDEO_ID_LEN) {
        Some(next) if is_id_byte(*next) => None,
        _ => Some(&s[..VIDEO_ID_LEN]),
    }
}

/// Extract the 11-character video id from a pasted URL or bare id.
///
/// Recognized forms: `watch?v=<id>`, `youtu.be/<id>`, `embed/<id>`,
/// `shorts/<id>`, `live/<id>`, and the bare id itself.
pub fn extract_video_id(input: &str) -> Result<String, VideoUrlError> {
    let trimmed = input.trim();

    if let Some(id) = take_id(trimmed) {
        if id.len() == trimmed.len() {
            return Ok(id.to_string());
        }
    }

    for marker in ["v=", "youtu.be/", "embed/", "shorts/", "live/"] {
        if let Some(at) = trimmed.find(marker) {
            let rest = &trimmed[at + marker.len()..];
            if let Some(id) = take_id(rest) {
                return Ok(id.to_string());
            }
        }
    }

    Err(VideoUrlError::NoMatch(trimmed.to_string()))
}

/// Video reducer owned by each client.
pub struct VideoReducer {
    state: VideoState,
    guard_window_ms: f64,
    /// When set, local player events are suppressed until this instant.
    guard_expires_at_ms: Option<f64>,
}

impl VideoReducer {
    pub fn new(guard_window_ms: f64) -> Self {
        Self {
            state: VideoState::default(),
            guard_window_ms,
            guard_expires_at_ms: None,
        }
    }

    pub fn state(&self) -> &VideoState {
        &self.state
    }

    /// Whether the remote-apply guard is still active at `now_ms`.
    ///
    /// The guard auto-expires; nothing cancels it early. Overlapping
    /// remote applies re-arm it rather than stacking.
    pub fn guard_active(&self, now_ms: f64) -> bool {
        match self.guard_expires_at_ms {
            Some(expires) => now_ms < expires,
            None => false,
        }
    }

    fn arm_guard(&mut self, now_ms: f64) {
        self.guard_expires_at_ms = Some(now_ms + self.guard_window_ms);
    }

    // === Authority-side actions ===

    pub fn play(&mut self, position: f64) -> VideoCommand {
        self.state.is_playing = true;
        self.state.last_known_position_seconds = position;
        VideoCommand::Play {
            current_time: position,
        }
    }

    pub fn pause(&mut self, position: f64) -> VideoCommand {
        self.state.is_playing = false;
        self.state.last_known_position_seconds = position;
        VideoCommand::Pause {
            current_time: position,
        }
    }

    pub fn seek(&mut self, position: f64) -> VideoCommand {
        self.state.last_known_position_seconds = position;
        VideoCommand::Seek {
            current_time: position,
        }
    }

    /// Validate a pasted URL or id and switch to that video, paused at
    /// the start.
    pub fn new_video(&mut self, input: &str) -> Result<VideoCommand, VideoUrlError> {
        let video_id = extract_video_id(input)?;
        self.state.current_video_id = video_id.clone();
        self.state.last_known_position_seconds = 0.0;
        self.state.is_playing = false;
        Ok(VideoCommand::NewVideo { video_id })
    }

    // === Mirror side ===

    /// Apply an authoritative command: update the shared state, drive
    /// the local player, and arm the echo guard.
    pub fn apply_remote<P: MediaPlayer>(
        &mut self,
        cmd: &VideoCommand,
        now_ms: f64,
        player: &mut P,
    ) {
        self.arm_guard(now_ms);
        match cmd {
            VideoCommand::Play { current_time } => {
                self.state.is_playing = true;
                self.state.last_known_position_seconds = *current_time;
                player.play();
            }
            VideoCommand::Pause { current_time } => {
                self.state.is_playing = false;
                self.state.last_known_position_seconds = *current_time;
                player.pause();
            }
            VideoCommand::Seek { current_time } => {
                self.state.last_known_position_seconds = *current_time;
                player.seek_to(*current_time);
            }
            VideoCommand::NewVideo { video_id } => {
                self.state.current_video_id = video_id.clone();
                self.state.last_known_position_seconds = 0.0;
                self.state.is_playing = false;
                player.load_video(video_id);
            }
        }
    }

    /// Feed a local player signal through the reducer. Returns the
    /// command to broadcast, or `None` when the event is an echo of a
    /// remote apply (guard active) or redundant with the current state.
    ///
    /// The caller is responsible for the authority check.
    pub fn local_player_event(&mut self, event: PlayerEvent, now_ms: f64) -> Option<VideoCommand> {
        if self.guard_active(now_ms) {
            // Track the position, but do not echo the change back out.
            let (PlayerEvent::Played { position }
            | PlayerEvent::Paused { position }
            | PlayerEvent::Seeked { position }) = event;
            self.state.last_known_position_seconds = position;
            return None;
        }
        match event {
            PlayerEvent::Played { position } => {
                if self.state.is_playing {
                    self.state.last_known_position_seconds = position;
                    None
                } else {
                    Some(self.play(position))
                }
            }
            PlayerEvent::Paused { position } => {
                if self.state.is_playing {
                    Some(self.pause(position))
                } else {
                    self.state.last_known_position_seconds = position;
                    None
                }
            }
            PlayerEvent::Seeked { position } => Some(self.seek(position)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PlayerCall, ScriptedPlayer};

    #[test]
    fn test_extract_bare_id() {
        assert_eq!(extract_video_id("abc12345678").unwrap(), "abc12345678");
        assert_eq!(extract_video_id(" dQw4w9WgXcQ ").unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_from_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ", "{url}");
        }
    }

    #[test]
    fn test_extract_rejects_garbage() {
        for input in ["", "short", "https://example.com/", "not a url at all"] {
            assert!(extract_video_id(input).is_err(), "{input}");
        }
    }

    #[test]
    fn test_new_video_updates_state() {
        let mut r = VideoReducer::new(200.0);
        let cmd = r.new_video("https://youtu.be/abc12345678").unwrap();
        assert_eq!(
            cmd,
            VideoCommand::NewVideo {
                video_id: "abc12345678".to_string()
            }
        );
        assert_eq!(r.state().current_video_id, "abc12345678");
        assert!(!r.state().is_playing);
    }

    #[test]
    fn test_apply_remote_drives_player() {
        let mut r = VideoReducer::new(200.0);
        let mut player = ScriptedPlayer::new();

        r.apply_remote(
            &VideoCommand::NewVideo {
                video_id: "abc12345678".to_string(),
            },
            1000.0,
            &mut player,
        );
        r.apply_remote(&VideoCommand::Seek { current_time: 42.5 }, 1010.0, &mut player);

        assert_eq!(
            player.calls,
            vec![
                PlayerCall::Load("abc12345678".to_string()),
                PlayerCall::SeekTo(42.5),
            ]
        );
        assert_eq!(r.state().current_video_id, "abc12345678");
        assert_eq!(r.state().last_known_position_seconds, 42.5);
    }

    #[test]
    fn test_guard_suppresses_echo_inside_window() {
        let mut r = VideoReducer::new(200.0);
        let mut player = ScriptedPlayer::new();

        r.apply_remote(&VideoCommand::Seek { current_time: 42.5 }, 1000.0, &mut player);
        // The player echoes the seek 50ms later; still inside the window.
        let out = r.local_player_event(PlayerEvent::Seeked { position: 42.5 }, 1050.0);
        assert_eq!(out, None);
    }

    #[test]
    fn test_guard_expires_after_window() {
        let mut r = VideoReducer::new(200.0);
        let mut player = ScriptedPlayer::new();

        r.apply_remote(&VideoCommand::Seek { current_time: 42.5 }, 1000.0, &mut player);
        assert!(r.guard_active(1199.0));
        assert!(!r.guard_active(1200.0));

        // A genuine local seek after expiry broadcasts again.
        let out = r.local_player_event(PlayerEvent::Seeked { position: 50.0 }, 1250.0);
        assert_eq!(out, Some(VideoCommand::Seek { current_time: 50.0 }));
    }

    #[test]
    fn test_overlapping_remote_applies_rearm_guard() {
        let mut r = VideoReducer::new(200.0);
        let mut player = ScriptedPlayer::new();

        r.apply_remote(&VideoCommand::Seek { current_time: 1.0 }, 1000.0, &mut player);
        r.apply_remote(&VideoCommand::Seek { current_time: 2.0 }, 1150.0, &mut player);
        // The second apply re-armed the guard; 1300 is inside its window.
        assert!(r.guard_active(1300.0));
        assert!(!r.guard_active(1350.0));
    }

    #[test]
    fn test_redundant_play_event_is_not_rebroadcast() {
        let mut r = VideoReducer::new(200.0);
        let out = r.local_player_event(PlayerEvent::Played { position: 3.0 }, 1000.0);
        assert_eq!(out, Some(VideoCommand::Play { current_time: 3.0 }));

        // The player confirming the state we already hold is not news.
        let echo = r.local_player_event(PlayerEvent::Played { position: 3.1 }, 2000.0);
        assert_eq!(echo, None);
        assert_eq!(r.state().last_known_position_seconds, 3.1);
    }

    #[test]
    fn test_wire_format_is_action_tagged() {
        let cmd = VideoCommand::NewVideo {
            video_id: "abc12345678".to_string(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "new_video");
        assert_eq!(json["videoId"], "abc12345678");

        let seek = VideoCommand::Seek { current_time: 42.5 };
        let json = serde_json::to_value(&seek).unwrap();
        assert_eq!(json["action"], "seek");
        assert_eq!(json["currentTime"], 42.5);
    }
}
