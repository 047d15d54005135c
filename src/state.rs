//! State machine for the typing engine
//!
//! Defines the lifecycle around auto-type:
//! Idle → AwaitingCompletion → Streaming → Idle
//!
//! Any state other than Idle locks out manual typing.

use crate::engine::playback::Playback;
use std::time::Instant;

/// Engine state
#[derive(Debug, Clone)]
pub enum State {
    /// Accepting keys
    Idle,

    /// Auto-type triggered, waiting for completion text
    AwaitingCompletion {
        /// When the trigger was pressed
        requested_at: Instant,
    },

    /// Playing completion text back one character per tick
    Streaming {
        /// When playback started
        started_at: Instant,
        /// Remaining characters
        playback: Playback,
    },
}

impl State {
    /// Create a new idle state
    pub fn new() -> Self {
        State::Idle
    }

    /// Check if in idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, State::Idle)
    }

    /// Manual input is locked while auto-type is pending or playing
    pub fn is_streaming(&self) -> bool {
        !self.is_idle()
    }

    /// Check if waiting for completion text
    pub fn is_awaiting_completion(&self) -> bool {
        matches!(self, State::AwaitingCompletion { .. })
    }

    /// Check if characters are being played back
    pub fn is_playing(&self) -> bool {
        matches!(self, State::Streaming { .. })
    }

    /// Progress of the current playback as (emitted, total)
    pub fn playback_progress(&self) -> Option<(usize, usize)> {
        match self {
            State::Streaming { playback, .. } => Some((playback.emitted(), playback.total())),
            _ => None,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::AwaitingCompletion { requested_at } => {
                write!(
                    f,
                    "Thinking ({:.1}s)",
                    requested_at.elapsed().as_secs_f32()
                )
            }
            State::Streaming { playback, .. } => {
                write!(f, "Typing ({}/{})", playback.emitted(), playback.total())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = State::new();
        assert!(state.is_idle());
        assert!(!state.is_streaming());
        assert!(state.playback_progress().is_none());
    }

    #[test]
    fn test_awaiting_completion_locks_input() {
        let state = State::AwaitingCompletion {
            requested_at: Instant::now(),
        };
        assert!(state.is_streaming());
        assert!(state.is_awaiting_completion());
        assert!(!state.is_playing());
        assert!(format!("{}", state).starts_with("Thinking"));
    }

    #[test]
    fn test_streaming_state() {
        let state = State::Streaming {
            started_at: Instant::now(),
            playback: Playback::new("hello").unwrap(),
        };
        assert!(state.is_streaming());
        assert!(state.is_playing());
        assert_eq!(state.playback_progress(), Some((0, 5)));
        assert_eq!(format!("{}", state), "Typing (0/5)");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", State::Idle), "Idle");
    }
}
