//! Clacker: a typewriter in your terminal
//!
//! This library provides the core functionality for:
//! - Turning key presses into paper contents with a jamming carriage
//!   (no automatic wrap when typing by hand)
//! - Ringing a bell a few columns before the margin
//! - Letting a ghostwriter continue the text, auto-typed one character at a
//!   time with its own wrap and hyphenation rules
//! - Synthesized mechanical sounds via rodio
//! - Saving papers across sessions
//!
//! # Architecture
//!
//! ```text
//!                            ┌─────────────────────────────────────┐
//!                            │              Session                │
//!                            │          (tokio::select!)           │
//!                            └─────────────────────────────────────┘
//!                                            │
//!                   ┌────────────────────────┼────────────────────────┐
//!                   │                        │                        │
//!                   ▼                        ▼                        ▼
//!          ┌──────────────┐         ┌──────────────┐         ┌──────────────┐
//!          │   Keyboard   │         │    Typing    │         │     View     │
//!          │ (crossterm)  │──keys──▶│    Engine    │──state─▶│ (crossterm)  │
//!          └──────────────┘         └──────────────┘         └──────────────┘
//!                                     │    ▲     │
//!                         Transition  │    │     │ completion request
//!                      sounds, edits  │    │     ▼
//!                                     │    │  ┌──────────────┐
//!                                     │    │  │  Completer   │ remote / command /
//!                                     │    │  │              │ filler sentences
//!                                     │    │  └──────────────┘
//!                                     │    │          │ text
//!                                     │    └──────────┘ playback ticks
//!                         ┌───────────┴───────────┐
//!                         ▼                       ▼
//!                 ┌──────────────┐        ┌──────────────┐
//!                 │    Audio     │        │ Paper Store  │
//!                 │   (rodio)    │        │    (JSON)    │
//!                 └──────────────┘        └──────────────┘
//! ```

pub mod audio;
pub mod cli;
pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod session;
pub mod state;
pub mod storage;
pub mod view;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use engine::{Key, KeyInput, TypingEngine};
pub use error::{ClackerError, Result};
pub use session::Session;
pub use state::State;
