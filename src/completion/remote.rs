//! Remote completion via an OpenAI-compatible chat completions API
//!
//! Works with OpenAI itself as well as local servers that speak the same
//! protocol (llama.cpp server, Ollama, vLLM).

use super::{Completer, SYSTEM_PROMPT};
use crate::config::CompletionConfig;
use crate::error::CompletionError;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Continuations are one or two sentences
const MAX_TOKENS: u32 = 120;

/// Remote completer using an OpenAI-compatible API
#[derive(Debug, Clone)]
pub struct RemoteCompleter {
    /// Base endpoint URL (e.g., "http://localhost:11434")
    endpoint: String,
    /// Model name to send to server
    model: String,
    /// Optional API key for authentication
    api_key: Option<String>,
    /// Request timeout
    timeout: Duration,
}

impl RemoteCompleter {
    /// Create a new remote completer from config
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        // Validate endpoint URL format
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(CompletionError::NotConfigured(format!(
                "completion.endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        let api_key = config.api_key.clone().filter(|key| !key.trim().is_empty());

        // The hosted default is useless without a key; local servers usually
        // don't need one.
        if api_key.is_none() && endpoint == DEFAULT_ENDPOINT {
            return Err(CompletionError::NotConfigured(
                "no API key; set completion.api_key or CLACKER_API_KEY".into(),
            ));
        }

        // Warn about non-HTTPS for non-localhost endpoints
        if endpoint.starts_with("http://")
            && !endpoint.contains("localhost")
            && !endpoint.contains("127.0.0.1")
            && !endpoint.contains("[::1]")
        {
            tracing::warn!(
                "Completion endpoint uses HTTP without TLS. Your paper will be transmitted unencrypted!"
            );
        }

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = Duration::from_secs(config.timeout_secs);

        tracing::info!(
            "Configured remote completer: endpoint={}, model={}, timeout={}s",
            endpoint,
            model,
            timeout.as_secs()
        );

        Ok(Self {
            endpoint,
            model,
            api_key,
            timeout,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }

    /// Build the JSON request body
    fn request_body(&self, current_text: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": current_text },
            ],
        })
    }

    /// Blocking request; run on a blocking thread
    fn request(&self, current_text: &str) -> Result<String, CompletionError> {
        let mut request = ureq::post(&self.url())
            .timeout(self.timeout)
            .set("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            request = request.set("Authorization", &format!("Bearer {}", key));
        }

        let response = request
            .send_json(self.request_body(current_text))
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    CompletionError::Remote(format!("Server returned {}: {}", code, body))
                }
                ureq::Error::Transport(t) => {
                    CompletionError::Network(format!("Request failed: {}", t))
                }
            })?;

        let json: Value = response
            .into_json()
            .map_err(|e| CompletionError::Remote(format!("Failed to parse response: {}", e)))?;

        parse_response(&json)
    }
}

/// Extract the continuation from a chat completions response
fn parse_response(json: &Value) -> Result<String, CompletionError> {
    let text = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            CompletionError::Remote(format!("Response missing message content: {}", json))
        })?;

    // Leading whitespace and quotes belong to the continuation
    let text = text.trim_end_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return Err(CompletionError::Empty);
    }
    Ok(text.to_string())
}

#[async_trait::async_trait]
impl Completer for RemoteCompleter {
    async fn complete(&self, current_text: &str) -> Result<String, CompletionError> {
        tracing::debug!(
            "Requesting completion for {} characters from {}",
            current_text.chars().count(),
            self.endpoint
        );

        let this = self.clone();
        let text = current_text.to_string();
        tokio::task::spawn_blocking(move || this.request(&text))
            .await
            .map_err(|e| CompletionError::Remote(format!("Completion task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>, api_key: Option<&str>) -> CompletionConfig {
        CompletionConfig {
            endpoint: endpoint.map(String::from),
            api_key: api_key.map(String::from),
            ..CompletionConfig::default()
        }
    }

    #[test]
    fn test_default_endpoint_requires_key() {
        let result = RemoteCompleter::new(&config(None, None));
        assert!(matches!(result, Err(CompletionError::NotConfigured(_))));
        assert!(result.unwrap_err().to_string().contains("API key"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(RemoteCompleter::new(&config(None, Some("  "))).is_err());
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let completer = RemoteCompleter::new(&config(Some("http://localhost:11434/"), None)).unwrap();
        assert_eq!(completer.url(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(completer.model, "gpt-4o-mini");
        assert_eq!(completer.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_url() {
        let result = RemoteCompleter::new(&config(Some("localhost:8080"), Some("k")));
        assert!(result.unwrap_err().to_string().contains("http://"));
    }

    #[test]
    fn test_request_body_structure() {
        let mut cfg = config(None, Some("sk-test"));
        cfg.model = Some("tiny-model".into());
        let completer = RemoteCompleter::new(&cfg).unwrap();
        let body = completer.request_body("It was a dark and stormy night");

        assert_eq!(body["model"], "tiny-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(
            body["messages"][1]["content"],
            "It was a dark and stormy night"
        );
        assert_eq!(completer.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "choices": [{ "message": { "role": "assistant", "content": " The rain stopped.\n" } }]
        });
        assert_eq!(parse_response(&json).unwrap(), " The rain stopped.");
    }

    #[test]
    fn test_parse_response_keeps_closing_quote() {
        let json = json!({
            "choices": [{ "message": { "content": " He said \"stop.\"\r\n" } }]
        });
        assert_eq!(parse_response(&json).unwrap(), " He said \"stop.\"");
    }

    #[test]
    fn test_parse_response_missing_content() {
        let json = json!({ "error": { "message": "quota exceeded" } });
        assert!(matches!(
            parse_response(&json),
            Err(CompletionError::Remote(_))
        ));
    }

    #[test]
    fn test_parse_response_empty_content() {
        let json = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(matches!(parse_response(&json), Err(CompletionError::Empty)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        let mut cfg = config(Some("http://127.0.0.1:9"), None);
        cfg.timeout_secs = 2;
        let completer = RemoteCompleter::new(&cfg).unwrap();
        let result = completer.complete("hello").await;
        assert!(matches!(result, Err(CompletionError::Network(_))));
    }
}
