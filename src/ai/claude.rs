//! Claude API client
//!
//! Sends one system/user prompt pair to the Anthropic Messages API and
//! returns the text of the reply.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::AiConfig;

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Claude API Client
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f64>,
}

/// Message role in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Request body for Claude API
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Response from Claude API
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Error response from Claude API
#[derive(Debug, Deserialize)]
struct ClaudeError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Text of a reply plus what it cost
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
    /// `max_tokens` when the reply was cut off
    pub stop_reason: Option<String>,
}

impl Completion {
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            max_tokens: 4096,
            temperature: None,
        })
    }

    /// Create a client from the `[ai]` table, reading the key from its env var
    pub fn from_config(ai: &AiConfig) -> Result<Self> {
        let api_key = std::env::var(&ai.api_key_env)
            .with_context(|| format!("{} environment variable not set", ai.api_key_env))?;
        Ok(Self::new(api_key, &ai.model)?
            .with_max_tokens(ai.max_tokens)
            .with_temperature(ai.temperature))
    }

    /// Set max tokens for response
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a message with system prompt
    pub async fn send_with_system(&self, content: &str, system: &str) -> Result<Completion> {
        let messages = vec![Message {
            role: Role::User,
            content: content.to_string(),
        }];
        self.complete(messages, Some(system)).await
    }

    /// Complete a conversation with full control
    pub async fn complete(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
    ) -> Result<Completion> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
            system,
            temperature: self.temperature,
        };

        debug!(model = %self.model, max_tokens = self.max_tokens, "sending request to Claude");

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        let status = response.status();

        if status.is_success() {
            let claude_response: ClaudeResponse = response
                .json()
                .await
                .context("Failed to parse Claude response")?;

            let text = claude_response
                .content
                .iter()
                .filter_map(|block| block.text.as_deref())
                .collect::<Vec<&str>>()
                .join("");

            debug!(
                input_tokens = claude_response.usage.input_tokens,
                output_tokens = claude_response.usage.output_tokens,
                "Claude responded"
            );

            Ok(Completion {
                text,
                usage: claude_response.usage,
                stop_reason: claude_response.stop_reason,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as Claude error
            if let Ok(claude_error) = serde_json::from_str::<ClaudeError>(&error_text) {
                anyhow::bail!(
                    "Claude API error ({}): {}",
                    claude_error.error.error_type,
                    claude_error.error.message
                );
            }

            anyhow::bail!("Claude API error ({}): {}", status, error_text);
        }
    }
}
