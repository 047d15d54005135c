//! Ghostwriter text completion
//!
//! Ctrl+Enter asks a completer to continue the paper. Completion is best
//! effort: any failure, or an empty answer, is replaced by one of the
//! built-in filler sentences so auto-type always has something to play.
//!
//! Backends:
//! - Remote OpenAI-compatible chat completions endpoint
//! - External shell command (local LLMs, scripts)
//! - None (filler sentences only)

pub mod command;
pub mod remote;

use crate::config::{CompletionBackend, CompletionConfig};
use crate::error::CompletionError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Instructions given to language models before the paper text
pub const SYSTEM_PROMPT: &str = "You are a ghostwriter living inside a typewriter. \
Continue the user's text naturally with one or two sentences, matching its tone and style. \
Never repeat the text you were given. Reply with the continuation only.";

/// Sentences typed when no completion is available
pub const FILLER: &[&str] = &[
    "The keys wait patiently. Every page starts with a single strike, and this one is no different.",
    "Somewhere between the bell and the carriage return, the next idea arrives.",
    "Chapter One. It was a quiet night, and the only sound in the room was the steady clack of the keys.",
    "Write first, fix later. The ribbon does not judge.",
    "Ink on paper, thoughts in motion.",
    "Slow down. Listen to the rhythm of the carriage.",
    "There is no delete key here, only the next line.",
    "Dear reader, if you have found this page, keep typing.",
    "The margin bell rings, the carriage slides home, and the story goes on.",
    "Press Ctrl+Enter again and the ghost in the machine will try once more.",
];

/// Trait for text completion implementations
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// Continue `current_text`, returning only the new text
    async fn complete(&self, current_text: &str) -> Result<String, CompletionError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Completer for `backend = "none"` and broken configurations
#[derive(Debug)]
pub struct DisabledCompleter {
    reason: String,
}

impl DisabledCompleter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl Completer for DisabledCompleter {
    async fn complete(&self, _current_text: &str) -> Result<String, CompletionError> {
        Err(CompletionError::NotConfigured(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Factory function to create the configured completer
///
/// A misconfigured backend does not fail startup; it degrades to filler
/// sentences with a warning.
pub fn create_completer(config: &CompletionConfig) -> Box<dyn Completer> {
    match config.backend {
        CompletionBackend::Remote => match remote::RemoteCompleter::new(config) {
            Ok(completer) => Box::new(completer),
            Err(e) => {
                tracing::warn!("Remote completion unavailable: {}", e);
                Box::new(DisabledCompleter::new(e.to_string()))
            }
        },
        CompletionBackend::Command => match command::CommandCompleter::new(config) {
            Ok(completer) => Box::new(completer),
            Err(e) => {
                tracing::warn!("Command completion unavailable: {}", e);
                Box::new(DisabledCompleter::new(e.to_string()))
            }
        },
        CompletionBackend::None => {
            tracing::debug!("Completion disabled, auto-type uses filler sentences");
            Box::new(DisabledCompleter::new("backend = 'none'"))
        }
    }
}

/// Pick a filler sentence uniformly at random
pub fn pick_filler<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FILLER.choose(rng).copied().unwrap_or_default()
}

/// Ask the completer, substituting a filler sentence on failure
///
/// The result is only empty if the filler list itself is.
pub async fn complete_or_fallback(completer: &dyn Completer, current_text: &str) -> String {
    let start = std::time::Instant::now();
    match completer.complete(current_text).await {
        Ok(text) if !text.trim().is_empty() => {
            tracing::info!(
                "{} completion returned {} characters in {:.2}s",
                completer.name(),
                text.chars().count(),
                start.elapsed().as_secs_f32()
            );
            text
        }
        Ok(_) => {
            tracing::warn!("{} completion was empty, using filler", completer.name());
            pick_filler(&mut rand::thread_rng()).to_string()
        }
        Err(e) => {
            tracing::warn!("{} completion failed: {}, using filler", completer.name(), e);
            pick_filler(&mut rand::thread_rng()).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FixedCompleter(Result<String, ()>);

    #[async_trait::async_trait]
    impl Completer for FixedCompleter {
        async fn complete(&self, _current_text: &str) -> Result<String, CompletionError> {
            self.0.clone().map_err(|_| CompletionError::Network("offline".into()))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_successful_completion_is_used() {
        let completer = FixedCompleter(Ok(" and then it rained.".into()));
        let text = complete_or_fallback(&completer, "It was dry").await;
        assert_eq!(text, " and then it rained.");
    }

    #[tokio::test]
    async fn test_empty_completion_falls_back() {
        for empty in ["", "   ", "\n"] {
            let completer = FixedCompleter(Ok(empty.into()));
            let text = complete_or_fallback(&completer, "x").await;
            assert!(FILLER.contains(&text.as_str()));
        }
    }

    #[tokio::test]
    async fn test_error_falls_back() {
        let completer = FixedCompleter(Err(()));
        let text = complete_or_fallback(&completer, "x").await;
        assert!(FILLER.contains(&text.as_str()));
    }

    #[tokio::test]
    async fn test_disabled_completer_falls_back() {
        let completer = create_completer(&CompletionConfig {
            backend: CompletionBackend::None,
            ..CompletionConfig::default()
        });
        assert_eq!(completer.name(), "none");
        assert!(completer.complete("x").await.is_err());
        let text = complete_or_fallback(completer.as_ref(), "x").await;
        assert!(!text.is_empty());
    }

    #[test]
    fn test_filler_entries_are_not_empty() {
        assert!(!FILLER.is_empty());
        assert!(FILLER.iter().all(|s| !s.trim().is_empty()));
    }

    #[test]
    fn test_pick_filler_reaches_every_entry() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(pick_filler(&mut rng));
        }
        assert_eq!(seen.len(), FILLER.len());
    }

    #[test]
    fn test_misconfigured_remote_degrades() {
        let completer = create_completer(&CompletionConfig {
            backend: CompletionBackend::Remote,
            endpoint: Some("not-a-url".into()),
            ..CompletionConfig::default()
        });
        assert_eq!(completer.name(), "none");
    }
}
