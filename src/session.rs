//! Session module - main event loop orchestration
//!
//! Coordinates the key listener, the typing engine, completion requests,
//! auto-type playback, sounds and paper autosave. Everything that touches
//! the engine happens on this loop, one event at a time.

use crate::audio::{SoundEvent, SoundPlayer};
use crate::completion::{self, Completer};
use crate::config::Config;
use crate::engine::{KeyInput, Request, Transition, TypingEngine};
use crate::error::Result;
use crate::keyboard::{KeyListener, KeyboardEvent};
use crate::storage::PaperStore;
use crate::view::{self, Screen};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How often pending paper changes are written to disk
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Redraw period for highlights and the "Thinking" timer while idle
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// One typing session on the current paper
pub struct Session {
    engine: TypingEngine,
    store: PaperStore,
    player: Box<dyn SoundPlayer>,
    completer: Arc<dyn Completer>,
    stream_interval: Duration,
    /// In-memory changes not yet flushed
    dirty: bool,
}

impl Session {
    /// Create a session on the store's current paper
    pub fn new(
        config: &Config,
        store: PaperStore,
        player: Box<dyn SoundPlayer>,
        completer: Arc<dyn Completer>,
    ) -> Self {
        let mut engine = TypingEngine::from_config(&config.engine);
        engine.load(store.current().content.as_str());

        Self {
            engine,
            store,
            player,
            completer,
            stream_interval: Duration::from_millis(config.engine.stream_interval_ms),
            dirty: false,
        }
    }

    pub fn engine(&self) -> &TypingEngine {
        &self.engine
    }

    pub fn store(&self) -> &PaperStore {
        &self.store
    }

    /// Run until the user quits or the key stream ends
    ///
    /// When the listener closes its channel, the session finishes any
    /// pending auto-type before returning. Frames are drawn to `out` when
    /// given.
    pub async fn run(
        &mut self,
        listener: &mut dyn KeyListener,
        mut out: Option<&mut dyn Write>,
    ) -> Result<()> {
        tracing::info!(
            "Typing on paper {} ({} characters, completion: {}, sound: {})",
            self.store.current_id(),
            self.engine.buffer().chars().count(),
            self.completer.name(),
            self.player.name()
        );

        let mut keys = listener.start().await?;
        let mut keys_closed = false;

        let mut completion: Option<JoinHandle<String>> = None;

        let mut playback = tokio::time::interval(self.stream_interval);
        playback.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut autosave = tokio::time::interval(AUTOSAVE_INTERVAL);
        autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut frame = tokio::time::interval(FRAME_INTERVAL);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_screen: Option<Screen> = None;

        loop {
            if let Some(out) = out.as_mut() {
                self.redraw(out, &mut last_screen)?;
            }

            if keys_closed && completion.is_none() && !self.engine.is_streaming() {
                tracing::debug!("Key stream ended, session finished");
                break;
            }

            tokio::select! {
                event = keys.recv(), if !keys_closed => {
                    match event {
                        Some(KeyboardEvent::Key(input)) => {
                            let transition = self.engine.handle_key(input, Instant::now());
                            if !self.engine.is_streaming() {
                                if let Some(task) = completion.take() {
                                    tracing::debug!("Dropping in-flight completion request");
                                    task.abort();
                                }
                            }
                            if let Some(task) = self.apply(transition) {
                                completion = Some(task);
                            }
                        }
                        Some(KeyboardEvent::Quit) => {
                            tracing::info!("Quit requested");
                            break;
                        }
                        None => keys_closed = true,
                    }
                }

                result = async {
                    match &mut completion {
                        Some(task) => task.await,
                        None => std::future::pending().await,
                    }
                } => {
                    completion = None;
                    match result {
                        Ok(text) => {
                            if self.engine.begin_auto_type(&text, Instant::now()) {
                                playback.reset();
                            }
                        }
                        Err(e) => {
                            tracing::error!("Completion task failed: {}", e);
                            self.engine.cancel_auto_type();
                        }
                    }
                }

                _ = playback.tick(), if self.engine.state().is_playing() => {
                    let transition = self.engine.tick(Instant::now());
                    self.apply(transition);
                    if !self.engine.is_streaming() {
                        // Auto-type done, persist the whole passage at once
                        self.save();
                    }
                }

                _ = autosave.tick(), if self.dirty => {
                    self.save();
                }

                _ = frame.tick(), if out.is_some() => {}

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT, shutting down...");
                    break;
                }
            }
        }

        if let Some(task) = completion.take() {
            task.abort();
        }
        listener.stop().await?;

        self.store.save_content(self.engine.buffer());
        self.store.flush()?;
        tracing::info!("Session ended, paper {} saved", self.store.current_id());

        Ok(())
    }

    /// Forward a transition to the collaborators
    ///
    /// Returns the completion task if the transition asked for one.
    fn apply(&mut self, transition: Transition) -> Option<JoinHandle<String>> {
        for sound in &transition.sounds {
            self.player.play(*sound);
        }

        if transition.changed {
            self.store.save_content(self.engine.buffer());
            self.dirty = true;
        }

        match transition.request? {
            Request::Completion { context } => {
                tracing::debug!(
                    "Requesting completion ({} characters of context)",
                    context.chars().count()
                );
                let completer = Arc::clone(&self.completer);
                Some(tokio::spawn(async move {
                    completion::complete_or_fallback(completer.as_ref(), &context).await
                }))
            }
            Request::NewPaper => {
                self.new_paper();
                None
            }
        }
    }

    fn new_paper(&mut self) {
        self.store.save_content(self.engine.buffer());
        self.store.create_default();
        self.engine.load(self.store.current().content.as_str());
        self.player.play(SoundEvent::Return);
        self.save();
    }

    fn save(&mut self) {
        match self.store.flush() {
            Ok(()) => self.dirty = false,
            Err(e) => tracing::warn!("Failed to save papers: {}", e),
        }
    }

    fn redraw(&self, out: &mut &mut dyn Write, last: &mut Option<Screen>) -> Result<()> {
        let (cols, rows) = view::terminal_size();
        let screen = Screen::compose(
            &self.engine,
            self.store.current(),
            Instant::now(),
            Screen::paper_rows_for(rows),
        );
        if last.as_ref() != Some(&screen) {
            view::draw(out, &screen, cols)?;
            *last = Some(screen);
        }
        Ok(())
    }
}

/// Auto-type `text` onto the engine's paper without a keyboard
///
/// Goes through the same trigger and playback path as Ctrl+Enter, so the
/// result wraps exactly as it would on screen.
pub async fn play(
    engine: &mut TypingEngine,
    text: &str,
    player: &dyn SoundPlayer,
    interval: Duration,
) -> bool {
    let trigger = engine.handle_key(KeyInput::named("Enter", true), Instant::now());
    if trigger.request.is_none() {
        return false;
    }
    if !engine.begin_auto_type(text, Instant::now()) {
        return false;
    }

    let mut ticker = tokio::time::interval(interval);
    while engine.state().is_playing() {
        ticker.tick().await;
        for sound in engine.tick(Instant::now()).sounds {
            player.play(sound);
        }
    }
    true
}
