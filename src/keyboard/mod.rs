//! Keyboard input
//!
//! A [`KeyListener`] turns whatever the user presses into engine
//! [`KeyInput`]s on a channel. The interactive session reads the terminal
//! through crossterm; tests and headless runs feed a script.

pub mod terminal;

use crate::engine::KeyInput;
use crate::error::TerminalError;
use tokio::sync::mpsc;

/// Events emitted by a key listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// A key for the typing engine
    Key(KeyInput),
    /// The user asked to leave (Ctrl+C, Ctrl+Q)
    Quit,
}

/// Trait for keyboard input implementations
#[async_trait::async_trait]
pub trait KeyListener: Send + Sync {
    /// Start listening for key events
    /// Returns a channel receiver for events
    async fn start(&mut self) -> Result<mpsc::Receiver<KeyboardEvent>, TerminalError>;

    /// Stop listening and clean up
    async fn stop(&mut self) -> Result<(), TerminalError>;
}

/// Listener that replays a fixed list of events, then closes its channel
#[derive(Debug, Default)]
pub struct ScriptedListener {
    events: Vec<KeyboardEvent>,
}

impl ScriptedListener {
    pub fn new(events: Vec<KeyboardEvent>) -> Self {
        Self { events }
    }

    /// Script that types `text` one key at a time
    pub fn typing(text: &str) -> Self {
        Self::new(
            text.chars()
                .map(|c| KeyboardEvent::Key(KeyInput::from(c)))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl KeyListener for ScriptedListener {
    async fn start(&mut self) -> Result<mpsc::Receiver<KeyboardEvent>, TerminalError> {
        let events = std::mem::take(&mut self.events);
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers the whole script
            let _ = tx.try_send(event);
        }
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), TerminalError> {
        Ok(())
    }
}

/// Factory function for the interactive listener
pub fn create_listener() -> Result<Box<dyn KeyListener>, TerminalError> {
    Ok(Box::new(terminal::TerminalListener::new()?))
}
