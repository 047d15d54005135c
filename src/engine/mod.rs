//! Typing engine
//!
//! Pure state transitions from key events to paper contents, carriage
//! position and sound cues. The engine does no I/O: it returns a
//! [`Transition`] describing which sounds to play and what the session
//! should do next, and the session forwards those to its collaborators.
//!
//! The paper buffer is the only stored text state. Column and carriage
//! offset are always recomputed from its trailing line, so manual edits,
//! auto-type and loading a saved paper can never drift apart.
//!
//! Manual typing jams at the margin ("stuck carriage": further keys
//! overwrite the last character). Auto-typed text wraps instead, see
//! [`wrap::wrap_step`].

pub mod highlight;
pub mod key;
pub mod playback;
pub mod wrap;

pub use key::{Key, KeyInput, Modifier};

use crate::audio::SoundEvent;
use crate::config::EngineConfig;
use crate::state::State;
use highlight::KeyHighlight;
use playback::Playback;
use std::time::{Duration, Instant};

/// Line geometry of the carriage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarriageMetrics {
    /// Column at which the carriage jams
    pub max_chars_per_line: usize,
    /// Carriage travel per character in pixels
    pub char_width: i32,
    /// Offset of an empty line in pixels
    pub initial_offset: i32,
    /// Bell rings when typing at `max_chars_per_line - bell_margin`
    pub bell_margin: usize,
}

impl CarriageMetrics {
    /// Carriage offset for a line holding `column` characters
    pub fn offset_for(&self, column: usize) -> i32 {
        let column = i32::try_from(column).unwrap_or(i32::MAX);
        self.initial_offset
            .saturating_sub(column.saturating_mul(self.char_width))
    }

    /// Pre-insert column at which the bell rings
    pub fn bell_column(&self) -> Option<usize> {
        self.max_chars_per_line.checked_sub(self.bell_margin)
    }
}

impl Default for CarriageMetrics {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for CarriageMetrics {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_chars_per_line: config.max_chars_per_line,
            char_width: config.char_width,
            initial_offset: config.initial_offset,
            bell_margin: config.bell_margin,
        }
    }
}

/// Length in characters of the text after the last line feed
pub fn column_of(text: &str) -> usize {
    text.rsplit('\n').next().map_or(0, |line| line.chars().count())
}

/// Something the session has to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fetch continuation text for the given paper contents, then call
    /// [`TypingEngine::begin_auto_type`]
    Completion { context: String },
    /// Start a fresh paper
    NewPaper,
}

/// Outcome of one engine step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Sounds to play, in order
    pub sounds: Vec<SoundEvent>,
    /// Follow-up work for the session
    pub request: Option<Request>,
    /// Whether the paper text changed
    pub changed: bool,
}

impl Transition {
    fn none() -> Self {
        Self::default()
    }

    fn sound(sound: SoundEvent) -> Self {
        Self {
            sounds: vec![sound],
            ..Self::default()
        }
    }

    fn edit(sounds: Vec<SoundEvent>) -> Self {
        Self {
            sounds,
            request: None,
            changed: true,
        }
    }

    /// Nothing happened
    pub fn is_noop(&self) -> bool {
        self.sounds.is_empty() && self.request.is_none() && !self.changed
    }
}

/// Input to the single transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key from the keyboard (manual typing)
    Key(KeyInput),
    /// The next auto-typed character
    Stream(char),
}

/// The typewriter: paper buffer plus auto-type state
#[derive(Debug, Clone)]
pub struct TypingEngine {
    buffer: String,
    metrics: CarriageMetrics,
    state: State,
    highlight: KeyHighlight,
}

impl TypingEngine {
    /// Create an engine with a blank paper
    pub fn new(metrics: CarriageMetrics, highlight: Duration) -> Self {
        Self {
            buffer: String::new(),
            metrics,
            state: State::Idle,
            highlight: KeyHighlight::new(highlight),
        }
    }

    /// Create an engine from the `[engine]` config section
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            CarriageMetrics::from(config),
            Duration::from_millis(config.highlight_ms),
        )
    }

    /// Put a saved paper in the machine
    ///
    /// Any pending or running auto-type is dropped.
    pub fn load(&mut self, content: impl Into<String>) {
        if !self.state.is_idle() {
            tracing::debug!("Loading paper while {}, cancelling auto-type", self.state);
        }
        self.buffer = content.into();
        self.state = State::Idle;
        self.highlight.clear();
    }

    /// The paper text
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Characters on the current line
    pub fn column(&self) -> usize {
        column_of(&self.buffer)
    }

    /// Horizontal carriage displacement for the current column
    pub fn carriage_offset(&self) -> i32 {
        self.metrics.offset_for(self.column())
    }

    pub fn metrics(&self) -> &CarriageMetrics {
        &self.metrics
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// True while auto-type is pending or playing (manual input locked)
    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// Key to highlight on the keyboard at `now`
    pub fn active_key(&self, now: Instant) -> Option<&str> {
        self.highlight.current(now)
    }

    /// Handle a key from the keyboard
    pub fn handle_key(&mut self, input: KeyInput, now: Instant) -> Transition {
        self.apply(Event::Key(input), now)
    }

    /// The one transition function for both manual keys and auto-type
    pub fn apply(&mut self, event: Event, now: Instant) -> Transition {
        match event {
            Event::Key(input) => {
                if self.state.is_streaming() {
                    if input.key == Key::Escape {
                        self.cancel_auto_type();
                    } else {
                        tracing::trace!("Ignoring {} while {}", input.key, self.state);
                    }
                    return Transition::none();
                }
                self.apply_key(input, now)
            }
            Event::Stream(c) => {
                if !self.state.is_playing() {
                    return Transition::none();
                }
                self.apply_stream_char(c)
            }
        }
    }

    fn apply_key(&mut self, input: KeyInput, now: Instant) -> Transition {
        if input.is_auto_type_trigger() {
            tracing::debug!("Auto-type triggered at column {}", self.column());
            self.state = State::AwaitingCompletion { requested_at: now };
            return Transition {
                sounds: vec![SoundEvent::KeyPress],
                request: Some(Request::Completion {
                    context: self.buffer.clone(),
                }),
                changed: false,
            };
        }

        if input.is_shortcut('n') {
            return Transition {
                request: Some(Request::NewPaper),
                ..Transition::none()
            };
        }

        match input.key {
            Key::Modifier(modifier) => {
                self.highlight.press(modifier.name(), now);
                Transition::none()
            }
            Key::Escape | Key::Other(_) | Key::AiTrigger => Transition::none(),
            Key::Backspace => {
                self.highlight.press(input.key.label(), now);
                if self.buffer.pop().is_none() {
                    return Transition::sound(SoundEvent::KeyPress);
                }
                Transition::edit(vec![SoundEvent::KeyPress])
            }
            Key::Enter => {
                self.highlight.press(input.key.label(), now);
                self.buffer.push('\n');
                Transition::edit(vec![SoundEvent::Return])
            }
            Key::Char(c) => {
                self.highlight.press(input.key.label(), now);
                self.type_char(c)
            }
        }
    }

    fn type_char(&mut self, c: char) -> Transition {
        let column = self.column();

        if column >= self.metrics.max_chars_per_line {
            // Stuck carriage: the type bar strikes the same spot again.
            self.buffer.pop();
            self.buffer.push(c);
            return Transition::edit(vec![SoundEvent::KeyPress]);
        }

        self.buffer.push(c);
        let mut sounds = vec![if c == ' ' {
            SoundEvent::Space
        } else {
            SoundEvent::KeyPress
        }];
        if self.metrics.bell_column() == Some(column) {
            sounds.push(SoundEvent::Bell);
        }
        Transition::edit(sounds)
    }

    fn apply_stream_char(&mut self, c: char) -> Transition {
        let step = wrap::wrap_step(
            c,
            self.column(),
            self.buffer.chars().next_back(),
            self.metrics.max_chars_per_line,
        );
        self.buffer.push_str(&step.insert);
        Transition::edit(vec![step.sound])
    }

    /// Start playing completion text after a [`Request::Completion`]
    ///
    /// Returns false, leaving the engine idle, when the text is empty or
    /// the request was cancelled in the meantime.
    pub fn begin_auto_type(&mut self, source: &str, now: Instant) -> bool {
        if !self.state.is_awaiting_completion() {
            tracing::debug!("Dropping completion text, engine is {}", self.state);
            return false;
        }

        match Playback::new(source) {
            Some(playback) => {
                tracing::debug!("Auto-typing {} characters", playback.total());
                self.state = State::Streaming {
                    started_at: now,
                    playback,
                };
                true
            }
            None => {
                tracing::debug!("Nothing to auto-type");
                self.state = State::Idle;
                false
            }
        }
    }

    /// Emit the next auto-typed character
    ///
    /// The engine returns to idle after the last character.
    pub fn tick(&mut self, now: Instant) -> Transition {
        let next = match &mut self.state {
            State::Streaming { playback, .. } => playback.next(),
            _ => return Transition::none(),
        };

        let transition = match next {
            Some(c) => self.apply(Event::Stream(c), now),
            None => Transition::none(),
        };

        if let State::Streaming {
            playback,
            started_at,
        } = &self.state
        {
            if playback.is_finished() {
                tracing::debug!(
                    "Auto-type finished: {} characters in {:.1}s",
                    playback.total(),
                    now.saturating_duration_since(*started_at).as_secs_f32()
                );
                self.state = State::Idle;
            }
        }

        transition
    }

    /// Stop a pending or running auto-type
    ///
    /// Characters already on the paper stay there. Returns whether anything
    /// was cancelled.
    pub fn cancel_auto_type(&mut self) -> bool {
        if self.state.is_idle() {
            return false;
        }
        tracing::info!("Auto-type cancelled ({})", self.state);
        self.state = State::Idle;
        true
    }
}
