//! Shared timer state machine.
//!
//! The authority drives every transition and re-broadcasts the full
//! state after each one; other clients overwrite their copy wholesale.
//! Full-state overwrite means a reordered or dropped broadcast is
//! repaired by the next one, at worst a second later while running.

use serde::{Deserialize, Serialize};

use crate::config::LobbyConfig;

/// Pomodoro phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    Work,
    Break,
}

/// Timer mode selector for `switch_mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    Pomodoro,
    Countdown,
}

/// The shared timer state, tagged by mode on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimerState {
    #[serde(rename_all = "camelCase")]
    Pomodoro {
        phase: PomodoroPhase,
        time_remaining_seconds: u32,
        is_running: bool,
    },
    #[serde(rename_all = "camelCase")]
    Countdown {
        duration_seconds: u32,
        time_remaining_seconds: u32,
        is_running: bool,
    },
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        match self {
            TimerState::Pomodoro { is_running, .. } | TimerState::Countdown { is_running, .. } => {
                *is_running
            }
        }
    }

    pub fn time_remaining_seconds(&self) -> u32 {
        match self {
            TimerState::Pomodoro {
                time_remaining_seconds,
                ..
            }
            | TimerState::Countdown {
                time_remaining_seconds,
                ..
            } => *time_remaining_seconds,
        }
    }

    pub fn mode(&self) -> TimerMode {
        match self {
            TimerState::Pomodoro { .. } => TimerMode::Pomodoro,
            TimerState::Countdown { .. } => TimerMode::Countdown,
        }
    }
}

/// Timer reducer owned by each client.
///
/// Authority-only transitions mutate and hand back the state to
/// broadcast; `apply_remote` is the mirror path for everyone else.
#[derive(Clone, Debug)]
pub struct TimerReducer {
    state: TimerState,
    work_duration_secs: u32,
    break_duration_secs: u32,
    default_countdown_secs: u32,
    /// Countdown duration configured during this session, kept across
    /// `reset` and mode switches.
    custom_countdown_secs: Option<u32>,
}

impl TimerReducer {
    pub fn new(config: &LobbyConfig) -> Self {
        Self {
            state: TimerState::Pomodoro {
                phase: PomodoroPhase::Work,
                time_remaining_seconds: config.work_duration_secs,
                is_running: false,
            },
            work_duration_secs: config.work_duration_secs,
            break_duration_secs: config.break_duration_secs,
            default_countdown_secs: config.countdown_duration_secs,
            custom_countdown_secs: None,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    fn countdown_secs(&self) -> u32 {
        self.custom_countdown_secs
            .unwrap_or(self.default_countdown_secs)
    }

    fn phase_duration(&self, phase: PomodoroPhase) -> u32 {
        match phase {
            PomodoroPhase::Work => self.work_duration_secs,
            PomodoroPhase::Break => self.break_duration_secs,
        }
    }

    /// Flip between running and paused. A finished countdown stays
    /// stopped; only `reset` or `switch_mode` leave that state.
    pub fn toggle_running(&mut self) -> &TimerState {
        match &mut self.state {
            TimerState::Pomodoro { is_running, .. } => *is_running = !*is_running,
            TimerState::Countdown {
                time_remaining_seconds,
                is_running,
                ..
            } => {
                if *time_remaining_seconds > 0 {
                    *is_running = !*is_running;
                }
            }
        }
        &self.state
    }

    /// Advance the timer by one second of wall time. No-op while paused.
    pub fn tick(&mut self) -> &TimerState {
        match &mut self.state {
            TimerState::Pomodoro {
                phase,
                time_remaining_seconds,
                is_running,
            } => {
                if *is_running {
                    *time_remaining_seconds = time_remaining_seconds.saturating_sub(1);
                    if *time_remaining_seconds == 0 {
                        // Work and break alternate forever.
                        *phase = match phase {
                            PomodoroPhase::Work => PomodoroPhase::Break,
                            PomodoroPhase::Break => PomodoroPhase::Work,
                        };
                        *time_remaining_seconds = match phase {
                            PomodoroPhase::Work => self.work_duration_secs,
                            PomodoroPhase::Break => self.break_duration_secs,
                        };
                    }
                }
            }
            TimerState::Countdown {
                time_remaining_seconds,
                is_running,
                ..
            } => {
                if *is_running {
                    *time_remaining_seconds = time_remaining_seconds.saturating_sub(1);
                    if *time_remaining_seconds == 0 {
                        *is_running = false;
                    }
                }
            }
        }
        &self.state
    }

    /// Discard the current state and start fresh in the target mode.
    pub fn switch_mode(&mut self, mode: TimerMode) -> &TimerState {
        self.state = match mode {
            TimerMode::Pomodoro => TimerState::Pomodoro {
                phase: PomodoroPhase::Work,
                time_remaining_seconds: self.work_duration_secs,
                is_running: false,
            },
            TimerMode::Countdown => TimerState::Countdown {
                duration_seconds: self.countdown_secs(),
                time_remaining_seconds: self.countdown_secs(),
                is_running: false,
            },
        };
        &self.state
    }

    /// Re-initialize the current mode, keeping any configured countdown
    /// duration.
    pub fn reset(&mut self) -> &TimerState {
        let mode = self.state.mode();
        self.switch_mode(mode)
    }

    /// Configure the countdown duration and restart the countdown with
    /// it. In pomodoro mode the duration is stored for the next switch.
    pub fn set_countdown_duration(&mut self, secs: u32) -> &TimerState {
        let secs = secs.max(1);
        self.custom_countdown_secs = Some(secs);
        if self.state.mode() == TimerMode::Countdown {
            self.state = TimerState::Countdown {
                duration_seconds: secs,
                time_remaining_seconds: secs,
                is_running: false,
            };
        }
        &self.state
    }

    /// Overwrite local state with an authoritative broadcast.
    /// Last message wins; there is no merge.
    pub fn apply_remote(&mut self, state: TimerState) {
        // Remember the remote countdown duration so a later local reset
        // (after an authority handover) keeps it.
        if let TimerState::Countdown {
            duration_seconds, ..
        } = &state
        {
            self.custom_countdown_secs = Some(*duration_seconds);
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer() -> TimerReducer {
        TimerReducer::new(&LobbyConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let r = reducer();
        assert_eq!(
            *r.state(),
            TimerState::Pomodoro {
                phase: PomodoroPhase::Work,
                time_remaining_seconds: 1500,
                is_running: false,
            }
        );
    }

    #[test]
    fn test_tick_is_noop_while_paused() {
        let mut r = reducer();
        r.tick();
        assert_eq!(r.state().time_remaining_seconds(), 1500);
    }

    #[test]
    fn test_pomodoro_cycles_forever() {
        let mut r = reducer();
        r.toggle_running();

        for _ in 0..1500 {
            r.tick();
        }
        assert_eq!(
            *r.state(),
            TimerState::Pomodoro {
                phase: PomodoroPhase::Break,
                time_remaining_seconds: 300,
                is_running: true,
            }
        );

        for _ in 0..300 {
            r.tick();
        }
        assert_eq!(
            *r.state(),
            TimerState::Pomodoro {
                phase: PomodoroPhase::Work,
                time_remaining_seconds: 1500,
                is_running: true,
            }
        );
    }

    #[test]
    fn test_countdown_terminates_and_holds() {
        let mut r = reducer();
        r.set_countdown_duration(600);
        r.switch_mode(TimerMode::Countdown);
        r.toggle_running();

        for _ in 0..600 {
            r.tick();
        }
        let finished = TimerState::Countdown {
            duration_seconds: 600,
            time_remaining_seconds: 0,
            is_running: false,
        };
        assert_eq!(*r.state(), finished);

        // Further ticks and toggles are no-ops in the finished state.
        r.tick();
        r.toggle_running();
        assert_eq!(*r.state(), finished);

        // Reset escapes, preserving the configured duration.
        r.reset();
        assert_eq!(
            *r.state(),
            TimerState::Countdown {
                duration_seconds: 600,
                time_remaining_seconds: 600,
                is_running: false,
            }
        );
    }

    #[test]
    fn test_switch_mode_discards_progress() {
        let mut r = reducer();
        r.toggle_running();
        for _ in 0..10 {
            r.tick();
        }
        r.switch_mode(TimerMode::Countdown);
        assert_eq!(
            *r.state(),
            TimerState::Countdown {
                duration_seconds: 600,
                time_remaining_seconds: 600,
                is_running: false,
            }
        );
        r.switch_mode(TimerMode::Pomodoro);
        assert_eq!(r.state().time_remaining_seconds(), 1500);
        assert!(!r.state().is_running());
    }

    #[test]
    fn test_apply_remote_is_last_write_wins() {
        let a = TimerState::Pomodoro {
            phase: PomodoroPhase::Break,
            time_remaining_seconds: 42,
            is_running: true,
        };
        let b = TimerState::Countdown {
            duration_seconds: 90,
            time_remaining_seconds: 7,
            is_running: false,
        };

        let mut r1 = reducer();
        r1.apply_remote(a.clone());
        r1.apply_remote(b.clone());
        assert_eq!(*r1.state(), b);

        // The end state does not depend on what came before.
        let mut r2 = reducer();
        r2.apply_remote(b.clone());
        assert_eq!(*r2.state(), b);
    }

    #[test]
    fn test_apply_remote_adopts_countdown_duration() {
        let mut r = reducer();
        r.apply_remote(TimerState::Countdown {
            duration_seconds: 90,
            time_remaining_seconds: 30,
            is_running: true,
        });
        r.reset();
        assert_eq!(
            *r.state(),
            TimerState::Countdown {
                duration_seconds: 90,
                time_remaining_seconds: 90,
                is_running: false,
            }
        );
    }

    #[test]
    fn test_wire_format_is_mode_tagged() {
        let state = TimerState::Pomodoro {
            phase: PomodoroPhase::Work,
            time_remaining_seconds: 1500,
            is_running: false,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"], "pomodoro");
        assert_eq!(json["phase"], "work");
        assert_eq!(json["timeRemainingSeconds"], 1500);
        assert_eq!(json["isRunning"], false);

        let back: TimerState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
