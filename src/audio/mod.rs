//! Typewriter sounds
//!
//! The engine classifies every transition into a [`SoundEvent`]; a
//! [`SoundPlayer`] turns those into noise. Playback is fire-and-forget and
//! never reports back to the engine.

pub mod feedback;

use crate::config::AudioFeedbackConfig;
use std::sync::{Arc, Mutex};

/// Sound event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    /// A type bar striking the paper
    KeyPress,
    /// The space bar (lower, duller thunk)
    Space,
    /// Carriage return: the zip of the carriage sliding back, then the bell
    Return,
    /// Margin warning bell
    Bell,
}

/// Something that can play sound events
pub trait SoundPlayer {
    /// Play a sound without waiting for it to finish
    fn play(&self, event: SoundEvent);

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

impl<P: SoundPlayer + ?Sized> SoundPlayer for Arc<P> {
    fn play(&self, event: SoundEvent) {
        (**self).play(event)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Player used when sound is muted or unavailable
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&self, event: SoundEvent) {
        tracing::trace!("(muted) {:?}", event);
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// Player that remembers what it was asked to play
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<SoundEvent>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything played so far, in order
    pub fn played(&self) -> Vec<SoundEvent> {
        self.played
            .lock()
            .map(|played| played.clone())
            .unwrap_or_default()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&self, event: SoundEvent) {
        if let Ok(mut played) = self.played.lock() {
            played.push(event);
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Factory function to create the configured sound player
///
/// Falls back to silence when sound is disabled or no output device can be
/// opened; a missing sound card should not stop anyone from typing.
pub fn create_player(config: &AudioFeedbackConfig) -> Box<dyn SoundPlayer> {
    if !config.enabled {
        tracing::debug!("Typewriter sounds disabled");
        return Box::new(SilentPlayer);
    }

    match feedback::AudioFeedback::new(config) {
        Ok(feedback) => {
            tracing::info!(
                "Typewriter sounds enabled (theme: {}, volume: {:.0}%)",
                config.theme,
                config.volume * 100.0
            );
            Box::new(feedback)
        }
        Err(e) => {
            tracing::warn!("Failed to initialize typewriter sounds: {}", e);
            Box::new(SilentPlayer)
        }
    }
}
