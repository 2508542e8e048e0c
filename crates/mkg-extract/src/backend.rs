//! LLM backend abstraction: the Extractor talks to `LlmBackend`, never to a
//! concrete provider, so tests run against `MockBackend` and production runs
//! point at `OllamaBackend`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(String),
    #[error("backend returned no content")]
    Empty,
}

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError>;
}

/// Cycles through canned responses in order, repeating the last one once
/// exhausted. Used by extraction tests so extraction logic is exercised
/// without a live model.
pub struct MockBackend {
    responses: Vec<String>,
    idx: AtomicUsize,
}

impl MockBackend {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            idx: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, BackendError> {
        if self.responses.is_empty() {
            return Err(BackendError::Empty);
        }
        let i = self.idx.fetch_add(1, Ordering::SeqCst);
        let i = i.min(self.responses.len() - 1);
        Ok(self.responses[i].clone())
    }
}

/// Talks to Ollama's `/api/chat` endpoint. Feature-gated so the default
/// build carries no HTTP client.
#[cfg(feature = "ollama")]
pub struct OllamaBackend {
    host: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "ollama")]
impl OllamaBackend {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Ok(Self {
            host: host.into(),
            model: model.into(),
            client,
        })
    }
}

#[cfg(feature = "ollama")]
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[cfg(feature = "ollama")]
#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

#[cfg(feature = "ollama")]
#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "format": "json",
            "options": { "temperature": 0 }
        });

        let client = self.client.clone();
        let resp = tokio::task::spawn_blocking(move || client.post(&url).json(&body).send())
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?
            .map_err(|e| BackendError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(BackendError::Http(format!("ollama http error {status}: {text}")));
        }

        let out: OllamaChatResponse = resp
            .json()
            .map_err(|e| BackendError::Http(format!("invalid JSON from ollama: {e}")))?;
        if out.message.content.trim().is_empty() {
            return Err(BackendError::Empty);
        }
        Ok(out.message.content)
    }
}

/// Best-effort JSON-object extraction from an LLM completion: try the whole
/// string first, then fall back to the substring between the first `{` and
/// the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}
