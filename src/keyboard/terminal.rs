//! Terminal key listener using crossterm
//!
//! Raw mode must be active (see [`crate::view::TerminalGuard`]) or the
//! terminal will line-buffer input and echo it.
//!
//! Most terminals cannot tell Ctrl+Enter from Ctrl+J, so both trigger
//! auto-type. F2 is an alternative trigger for terminals that swallow both.

use super::{KeyListener, KeyboardEvent};
use crate::engine::{Key, KeyInput, Modifier};
use crate::error::TerminalError;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode,
};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How long one poll waits before checking the stop signal
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reads key events from the controlling terminal
pub struct TerminalListener {
    stop_signal: Option<oneshot::Sender<()>>,
}

impl TerminalListener {
    pub fn new() -> Result<Self, TerminalError> {
        if !std::io::stdin().is_terminal() {
            return Err(TerminalError::NotATty);
        }
        Ok(Self { stop_signal: None })
    }
}

#[async_trait::async_trait]
impl KeyListener for TerminalListener {
    async fn start(&mut self) -> Result<mpsc::Receiver<KeyboardEvent>, TerminalError> {
        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_signal = Some(stop_tx);

        tokio::task::spawn_blocking(move || {
            if let Err(e) = listener_loop(tx, stop_rx) {
                tracing::error!("Key listener failed: {}", e);
            }
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), TerminalError> {
        if let Some(stop) = self.stop_signal.take() {
            let _ = stop.send(());
        }
        Ok(())
    }
}

/// Main listener loop running in a blocking task
fn listener_loop(
    tx: mpsc::Sender<KeyboardEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), TerminalError> {
    tracing::debug!("Listening for terminal key events");

    loop {
        // Check for stop signal (non-blocking)
        match stop_rx.try_recv() {
            Ok(_) | Err(oneshot::error::TryRecvError::Closed) => {
                tracing::debug!("Key listener stopping");
                return Ok(());
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
        }

        if !event::poll(POLL_INTERVAL).map_err(TerminalError::Input)? {
            continue;
        }

        if let Event::Key(key_event) = event::read().map_err(TerminalError::Input)? {
            let Some(event) = map_key_event(&key_event) else {
                continue;
            };
            tracing::trace!("Key event: {:?}", event);
            if tx.blocking_send(event).is_err() {
                // Session is gone
                return Ok(());
            }
        }
    }
}

/// Translate a crossterm key event
///
/// Returns `None` for key releases and keys the typewriter has no use for.
pub fn map_key_event(event: &KeyEvent) -> Option<KeyboardEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let key = match event.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' | 'q' => return Some(KeyboardEvent::Quit),
            'j' => return Some(KeyboardEvent::Key(KeyInput::with_ctrl(Key::Enter))),
            'h' => Key::Backspace,
            c => Key::Char(c),
        },
        KeyCode::Char(c) => Key::from_char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab | KeyCode::BackTab => Key::Modifier(Modifier::Tab),
        KeyCode::CapsLock => Key::Modifier(Modifier::CapsLock),
        KeyCode::F(2) => Key::AiTrigger,
        KeyCode::Modifier(code) => Key::Modifier(modifier_for(code)?),
        KeyCode::Left => Key::Other("ArrowLeft".into()),
        KeyCode::Right => Key::Other("ArrowRight".into()),
        KeyCode::Up => Key::Other("ArrowUp".into()),
        KeyCode::Down => Key::Other("ArrowDown".into()),
        KeyCode::F(n) => Key::Other(format!("F{}", n)),
        _ => return None,
    };

    Some(KeyboardEvent::Key(KeyInput { key, ctrl }))
}

fn modifier_for(code: ModifierKeyCode) -> Option<Modifier> {
    match code {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some(Modifier::Shift),
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some(Modifier::Control),
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => Some(Modifier::Alt),
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta => Some(Modifier::Meta),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyboardEvent> {
        map_key_event(&KeyEvent::new(code, modifiers))
    }

    fn key(k: Key) -> Option<KeyboardEvent> {
        Some(KeyboardEvent::Key(KeyInput::new(k)))
    }

    #[test]
    fn test_printable_keys() {
        assert_eq!(press(KeyCode::Char('a'), KeyModifiers::NONE), key(Key::Char('a')));
        assert_eq!(press(KeyCode::Char('A'), KeyModifiers::SHIFT), key(Key::Char('A')));
        assert_eq!(press(KeyCode::Char(' '), KeyModifiers::NONE), key(Key::Char(' ')));
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), key(Key::Enter));
        assert_eq!(press(KeyCode::Backspace, KeyModifiers::NONE), key(Key::Backspace));
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), key(Key::Escape));
        assert_eq!(
            press(KeyCode::Tab, KeyModifiers::NONE),
            key(Key::Modifier(Modifier::Tab))
        );
    }

    #[test]
    fn test_auto_type_triggers() {
        let trigger = Some(KeyboardEvent::Key(KeyInput::with_ctrl(Key::Enter)));
        assert_eq!(press(KeyCode::Enter, KeyModifiers::CONTROL), trigger);
        assert_eq!(press(KeyCode::Char('j'), KeyModifiers::CONTROL), trigger);
        assert_eq!(press(KeyCode::F(2), KeyModifiers::NONE), key(Key::AiTrigger));
    }

    #[test]
    fn test_quit_shortcuts() {
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(KeyboardEvent::Quit)
        );
        assert_eq!(
            press(KeyCode::Char('Q'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            Some(KeyboardEvent::Quit)
        );
    }

    #[test]
    fn test_ctrl_letters_keep_ctrl() {
        assert_eq!(
            press(KeyCode::Char('n'), KeyModifiers::CONTROL),
            Some(KeyboardEvent::Key(KeyInput::with_ctrl(Key::Char('n'))))
        );
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(
            press(
                KeyCode::Modifier(ModifierKeyCode::LeftShift),
                KeyModifiers::SHIFT
            ),
            key(Key::Modifier(Modifier::Shift))
        );
        assert_eq!(
            press(KeyCode::CapsLock, KeyModifiers::NONE),
            key(Key::Modifier(Modifier::CapsLock))
        );
    }

    #[test]
    fn test_releases_and_unknown_keys_are_dropped() {
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(map_key_event(&release), None);
        assert_eq!(press(KeyCode::Insert, KeyModifiers::NONE), None);
        assert_eq!(
            press(KeyCode::Left, KeyModifiers::NONE),
            key(Key::Other("ArrowLeft".into()))
        );
    }
}
