//! Chat Backend Client
//!
//! Thin client for an OpenAI-compatible chat completions endpoint. One
//! blocking request, one response; no streaming, no retries. The only
//! design decision that matters here is the explicit timeout: the voice
//! loop calls this while holding the user's attention, so a hung backend
//! degrades into an apology instead of a frozen assistant.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::ChatError;

/// A single user/assistant exchange unit sent to the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
}

/// Request body for the chat completions endpoint
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation so far, oldest first
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for a single chat backend
#[derive(Clone)]
pub struct ChatClient {
    url: String,
    model: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl ChatClient {
    /// Build a client from backend config
    pub fn new(config: &BackendConfig) -> Result<Self, ChatError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: config.url.clone(),
            model: config.model.clone(),
            timeout,
            http_client,
        })
    }

    /// Send a prompt with optional system context; returns the assistant's
    /// reply text.
    pub async fn ask(&self, system: Option<&str>, prompt: &str) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ChatError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    ChatError::Transport(err)
                }
            })?;

        let body: ChatResponse = response.json().await.map_err(|err| {
            ChatError::MalformedResponse(format!("failed to decode chat body: {err}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::MalformedResponse("response had no choices".to_string()))
    }

    /// Quick reachability probe
    pub async fn health_check(&self) -> bool {
        self.http_client
            .post(&self.url)
            .timeout(Duration::from_secs(5))
            .json(&ChatRequest {
                model: self.model.clone(),
                messages: vec![],
            })
            .send()
            .await
            .is_ok()
    }
}
