//! Completion provider seam and the Anthropic Messages API client behind it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::{debug, info};

use crate::{lib::errors::RefineError, server::config::ProviderConfig};

use super::compiler::CompiledMessagePair;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MESSAGES_PATH: &str = "/v1/messages";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Trimmed text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
}

/// Remote text-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: &CompiledMessagePair) -> Result<CompletionResult, RefineError>;

    /// Model identifier reported in logs and server instructions.
    fn model(&self) -> &str;
}

/// Single-attempt client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    config: ProviderConfig,
    http: Client,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(format!("refine-prompt-mcp/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}{MESSAGES_PATH}", self.config.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        api_key: &str,
        body: &MessagesRequest<'_>,
    ) -> Result<CompletionResult, RefineError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|err| RefineError::ProviderInvocationFailed {
                reason: err.to_string(),
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| RefineError::ProviderInvocationFailed {
                reason: format!("failed to read response body: {err}"),
            })?;

        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }

        let payload: MessagesResponse =
            serde_json::from_slice(&bytes).map_err(|err| RefineError::UnexpectedOutputShape {
                reason: format!("response is not a messages payload ({err})"),
            })?;
        extract_text(payload)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, messages: &CompiledMessagePair) -> Result<CompletionResult, RefineError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| RefineError::MissingCredential {
                env_var: self.config.api_key_env.clone(),
            })?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &messages.system,
            messages: [WireMessage {
                role: "user",
                content: &messages.user,
            }],
        };

        debug!(
            target: "refine_prompt::provider",
            endpoint = %self.endpoint(),
            model = %self.config.model,
            "Sending completion request"
        );
        let started_at = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let result = time::timeout(timeout, self.send(api_key, &body))
            .await
            .map_err(|_| RefineError::Timeout {
                duration_secs: self.config.timeout_secs,
            })??;

        info!(
            target: "refine_prompt::provider",
            model = %self.config.model,
            output_chars = result.text.chars().count(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Completion received"
        );
        Ok(result)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [WireMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text(payload: MessagesResponse) -> Result<CompletionResult, RefineError> {
    let joined: String = payload
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();
    let text = joined.trim();
    if text.is_empty() {
        return Err(RefineError::UnexpectedOutputShape {
            reason: "model returned no text content".into(),
        });
    }
    Ok(CompletionResult {
        text: text.to_string(),
    })
}

fn status_error(status: StatusCode, body: &[u8]) -> RefineError {
    let detail = serde_json::from_slice::<ErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());
    RefineError::ProviderInvocationFailed {
        reason: format!("upstream status {status}: {detail}"),
    }
}
