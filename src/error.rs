//! Error types for clacker
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.
//!
//! The typing engine itself never fails: unknown keys are ignored and
//! Backspace on an empty paper is a no-op. Everything here belongs to the
//! collaborators around it.

use thiserror::Error;

/// Top-level error type for the clacker application
#[derive(Error, Debug)]
pub enum ClackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Paper storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] TerminalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the text-completion collaborator
///
/// None of these reach the user: the session logs them and streams a
/// filler sentence instead.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion is not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote server error: {0}")]
    Remote(String),

    #[error("Completion command failed: {0}")]
    Command(String),

    #[error("Completion timed out after {0}s")]
    Timeout(u64),

    #[error("Completion returned no text")]
    Empty,
}

/// Errors related to the paper store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Paper file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Paper not found: {0}")]
    NotFound(String),

    #[error("Cannot delete the last remaining paper")]
    LastPaper,
}

/// Errors related to sound output
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio feedback is disabled")]
    Disabled,

    #[error("Failed to open audio output: {0}")]
    Output(String),

    #[error("Sound theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Failed to encode sound: {0}")]
    Encode(String),
}

/// Errors related to the interactive terminal
#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Not running in an interactive terminal")]
    NotATty,

    #[error("Terminal setup failed: {0}")]
    Setup(std::io::Error),

    #[error("Failed to read key events: {0}")]
    Input(std::io::Error),

    #[error("Failed to draw: {0}")]
    Draw(std::io::Error),
}

/// Result type alias using ClackerError
pub type Result<T> = std::result::Result<T, ClackerError>;
