//! Configuration loading and types for clacker
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/clacker/config.toml)
//! 3. Environment variables (CLACKER_*)
//! 4. CLI arguments (highest priority)

use crate::error::ClackerError;
use crate::storage::Texture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# Clacker Configuration
#
# Location: ~/.config/clacker/config.toml
# All settings can be overridden via CLI flags

[engine]
# Characters per line before the carriage jams.
# Manual typing past this point overwrites the last character;
# auto-type wraps (with a hyphen when it has to break a word).
max_chars_per_line = 42

# Carriage travel per character, in pixels
char_width = 12

# Carriage offset for an empty line, in pixels
initial_offset = 270

# Ring the bell this many characters before the margin
bell_margin = 5

# Delay between auto-typed characters in milliseconds
stream_interval_ms = 50

# How long a struck key stays highlighted, in milliseconds
highlight_ms = 150

[audio.feedback]
# Play typewriter sounds (key clicks, space bar, carriage return, bell)
enabled = true

# Sound theme: "typewriter", "soft", or path to a directory containing
# key.wav, space.wav, return.wav and bell.wav
theme = "typewriter"

# Volume level (0.0 to 1.0)
volume = 0.7

[completion]
# Where Ctrl+Enter gets its continuation from:
# - remote: OpenAI-compatible chat completions endpoint
# - command: shell command, receives the paper on stdin, prints the continuation
# - none: always use the built-in filler sentences
backend = "remote"

# endpoint = "https://api.openai.com"
# model = "gpt-4o-mini"
# api_key = "sk-..."   # or set CLACKER_API_KEY
timeout_secs = 30

# command = "ollama run llama3.2:1b 'Continue this text with one or two sentences:'"

[storage]
# Paper file location: "auto" uses ~/.local/share/clacker/papers.json
path = "auto"

# Texture for new papers: cream, white, lined or grid
default_texture = "cream"
"#;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Typing engine geometry and timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Maximum column before the carriage jams (manual) or wraps (auto-type)
    #[serde(default = "default_max_chars_per_line")]
    pub max_chars_per_line: usize,

    /// Carriage travel per character in pixels
    #[serde(default = "default_char_width")]
    pub char_width: i32,

    /// Carriage offset for an empty line in pixels
    #[serde(default = "default_initial_offset")]
    pub initial_offset: i32,

    /// Bell rings when a character is typed this many columns before the limit
    #[serde(default = "default_bell_margin")]
    pub bell_margin: usize,

    /// Auto-type period per character in milliseconds
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,

    /// Key highlight duration in milliseconds
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

fn default_max_chars_per_line() -> usize {
    42
}

fn default_char_width() -> i32 {
    12
}

fn default_initial_offset() -> i32 {
    // Half of a 700px sheet minus its 80px left padding
    700 / 2 - 80
}

fn default_bell_margin() -> usize {
    5
}

fn default_stream_interval_ms() -> u64 {
    50
}

fn default_highlight_ms() -> u64 {
    150
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chars_per_line: default_max_chars_per_line(),
            char_width: default_char_width(),
            initial_offset: default_initial_offset(),
            bell_margin: default_bell_margin(),
            stream_interval_ms: default_stream_interval_ms(),
            highlight_ms: default_highlight_ms(),
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Typewriter sound settings
    #[serde(default)]
    pub feedback: AudioFeedbackConfig,
}

/// Audio feedback configuration for typewriter sounds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioFeedbackConfig {
    /// Enable typewriter sounds
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sound theme: "typewriter", "soft", or path to custom theme directory
    #[serde(default = "default_sound_theme")]
    pub theme: String,

    /// Volume level (0.0 to 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_sound_theme() -> String {
    "typewriter".to_string()
}

fn default_volume() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

impl Default for AudioFeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: default_sound_theme(),
            volume: default_volume(),
        }
    }
}

/// Completion backend selection
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionBackend {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    Remote,
    /// External shell command
    Command,
    /// Never ask anyone, always use filler sentences
    None,
}

/// Text-completion collaborator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub backend: CompletionBackend,

    /// Base endpoint URL (default: https://api.openai.com)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name sent to the endpoint (default: gpt-4o-mini)
    #[serde(default)]
    pub model: Option<String>,

    /// API key for the remote backend (falls back to CLACKER_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds, for both remote and command backends
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,

    /// Shell command for the command backend
    #[serde(default)]
    pub command: Option<String>,
}

fn default_completion_timeout() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            backend: CompletionBackend::default(),
            endpoint: None,
            model: None,
            api_key: None,
            timeout_secs: default_completion_timeout(),
            command: None,
        }
    }
}

/// Paper storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Path of the paper file, or "auto" for the data directory
    #[serde(default = "default_storage_path")]
    pub path: String,

    /// Texture given to newly created papers
    #[serde(default)]
    pub default_texture: Texture,
}

fn default_storage_path() -> String {
    "auto".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            default_texture: Texture::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "clacker")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the runtime directory for ephemeral files (session log)
    pub fn runtime_dir() -> PathBuf {
        // Use XDG_RUNTIME_DIR if available, otherwise fall back to /tmp
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("clacker")
    }

    /// Get the data directory path (for papers)
    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "clacker")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Where the interactive session writes its log
    pub fn log_path() -> PathBuf {
        Self::runtime_dir().join("clacker.log")
    }

    /// Resolve the paper file path from config
    pub fn resolve_storage_path(&self) -> PathBuf {
        match self.storage.path.as_str() {
            "auto" | "" => Self::data_dir().join("papers.json"),
            path => PathBuf::from(path),
        }
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<(), ClackerError> {
        if self.engine.max_chars_per_line == 0 {
            return Err(ClackerError::Config(
                "engine.max_chars_per_line must be at least 1".into(),
            ));
        }
        if self.engine.char_width <= 0 {
            return Err(ClackerError::Config(
                "engine.char_width must be positive".into(),
            ));
        }
        if self.engine.stream_interval_ms == 0 {
            return Err(ClackerError::Config(
                "engine.stream_interval_ms must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.audio.feedback.volume) {
            return Err(ClackerError::Config(format!(
                "audio.feedback.volume must be between 0.0 and 1.0, got {}",
                self.audio.feedback.volume
            )));
        }
        if self.completion.backend == CompletionBackend::Command
            && self.completion.command.is_none()
        {
            return Err(ClackerError::Config(
                "completion.command is required when backend = 'command'".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(path: Option<&Path>) -> Result<Config, ClackerError> {
    // Start with defaults
    let mut config = Config::default();

    // Determine config file path
    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    // Load from file if it exists
    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ClackerError::Config(format!("Failed to read config: {}", e)))?;

            config = toml::from_str(&contents)
                .map_err(|e| ClackerError::Config(format!("Invalid config: {}", e)))?;
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    Ok(config)
}

/// Override config values from CLACKER_* environment variables
fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(max) = var("CLACKER_MAX_CHARS") {
        match max.parse::<usize>() {
            Ok(max) => config.engine.max_chars_per_line = max,
            Err(_) => tracing::warn!("Ignoring invalid CLACKER_MAX_CHARS: {:?}", max),
        }
    }
    if let Some(key) = var("CLACKER_API_KEY") {
        config.completion.api_key = Some(key);
    }
    if let Some(backend) = var("CLACKER_COMPLETION_BACKEND") {
        config.completion.backend = match backend.to_lowercase().as_str() {
            "command" => CompletionBackend::Command,
            "none" | "off" => CompletionBackend::None,
            _ => CompletionBackend::Remote,
        };
    }
    if var("CLACKER_MUTE").is_some() {
        config.audio.feedback.enabled = false;
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ClackerError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ClackerError::Config(format!("Failed to create config dir: {}", e)))?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| ClackerError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, contents)
        .map_err(|e| ClackerError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.max_chars_per_line, 42);
        assert_eq!(config.engine.char_width, 12);
        assert_eq!(config.engine.initial_offset, 270);
        assert_eq!(config.engine.stream_interval_ms, 50);
        assert!(config.audio.feedback.enabled);
        assert_eq!(config.completion.backend, CompletionBackend::Remote);
        assert_eq!(config.storage.default_texture, Texture::Cream);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_text_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.engine.max_chars_per_line, 42);
        assert_eq!(config.audio.feedback.theme, "typewriter");
        assert_eq!(config.completion.timeout_secs, 30);
        assert_eq!(config.storage.path, "auto");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
            [engine]
            max_chars_per_line = 60

            [audio.feedback]
            enabled = false
            theme = "soft"

            [completion]
            backend = "command"
            command = "cat"

            [storage]
            default_texture = "lined"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.max_chars_per_line, 60);
        assert_eq!(config.engine.char_width, 12); // default
        assert!(!config.audio.feedback.enabled);
        assert_eq!(config.audio.feedback.theme, "soft");
        assert_eq!(config.completion.backend, CompletionBackend::Command);
        assert_eq!(config.completion.command.as_deref(), Some("cat"));
        assert_eq!(config.storage.default_texture, Texture::Lined);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_width_line() {
        let mut config = Config::default();
        config.engine.max_chars_per_line = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_chars_per_line"));
    }

    #[test]
    fn test_validate_requires_command_for_command_backend() {
        let mut config = Config::default();
        config.completion.backend = CompletionBackend::Command;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |name| match name {
            "CLACKER_MAX_CHARS" => Some("30".into()),
            "CLACKER_API_KEY" => Some("sk-test".into()),
            "CLACKER_COMPLETION_BACKEND" => Some("none".into()),
            "CLACKER_MUTE" => Some("1".into()),
            _ => None,
        });
        assert_eq!(config.engine.max_chars_per_line, 30);
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.completion.backend, CompletionBackend::None);
        assert!(!config.audio.feedback.enabled);
    }

    #[test]
    fn test_invalid_env_max_chars_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |name| {
            (name == "CLACKER_MAX_CHARS").then(|| "lots".to_string())
        });
        assert_eq!(config.engine.max_chars_per_line, 42);
    }

    #[test]
    fn test_explicit_storage_path() {
        let mut config = Config::default();
        config.storage.path = "/tmp/papers.json".into();
        assert_eq!(config.resolve_storage_path(), PathBuf::from("/tmp/papers.json"));
    }

    #[test]
    fn test_save_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.engine.max_chars_per_line = 50;
        save_config(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.engine.max_chars_per_line, 50);
    }
}
