//! HTTP client for the agent.market API.
//!
//! Two endpoints matter: `POST /v1/instances` creates an analysis instance
//! from a background prompt, `GET /v1/chat/{id}` returns the instance's
//! conversation transcript. The provider answers with human-in-the-loop
//! latency, so the transcript is polled with a bounded attempt budget.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::settings::AgentMarketConfig;

/// Timeout for individual HTTP requests (not the overall poll budget).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of an instance's conversation transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub message: String,
    /// ISO-8601 timestamp; lexicographic order is chronological order.
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct CreateInstanceRequest<'a> {
    background: &'a str,
    max_credit_per_instance: f64,
    instance_timeout: u64,
    gen_reward_timeout: u64,
    percentage_reward: f64,
    side_effect_free: bool,
    max_providers: u32,
    contest_mode: bool,
}

#[derive(Debug, Deserialize)]
struct CreateInstanceResponse {
    id: Option<String>,
}

/// Client for the agent.market instance API.
pub struct AgentMarketClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    config: AgentMarketConfig,
}

impl AgentMarketClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns `AnalysisError::MissingApiKey` when the key is empty and
    /// `AnalysisError::Transport` when the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: AgentMarketConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            config,
        })
    }

    /// Create an analysis instance from a background prompt.
    ///
    /// # Errors
    /// `Transport` on network/status failures, `NoInstanceId` when the
    /// service answers without an id.
    pub async fn create_instance(&self, background: &str) -> Result<String> {
        let request = CreateInstanceRequest {
            background,
            max_credit_per_instance: self.config.max_credit_per_instance,
            instance_timeout: self.config.instance_timeout_secs,
            gen_reward_timeout: self.config.gen_reward_timeout_secs,
            percentage_reward: self.config.percentage_reward,
            side_effect_free: self.config.side_effect_free,
            max_providers: self.config.max_providers,
            contest_mode: self.config.contest_mode,
        };

        let url = format!("{}/v1/instances", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Transport(format!("HTTP {status}: {body}")));
        }

        let created: CreateInstanceResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Transport(format!("Failed to parse response: {e}")))?;

        match created.id {
            Some(id) if !id.is_empty() => {
                info!(instance_id = %id, "Created agent.market instance");
                Ok(id)
            }
            _ => Err(AnalysisError::NoInstanceId),
        }
    }

    /// Fetch the conversation transcript for an instance.
    ///
    /// # Errors
    /// `Transport` on network/status failures; `UnexpectedPayload` when the
    /// body is not a JSON array of messages (a protocol violation the poll
    /// loop does not retry).
    pub async fn fetch_chat_messages(&self, instance_id: &str) -> Result<Vec<ChatMessage>> {
        let url = format!("{}/v1/chat/{instance_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Transport(format!("HTTP {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&body).map_err(|e| AnalysisError::UnexpectedPayload {
            instance_id: instance_id.to_string(),
            detail: e.to_string(),
        })
    }

    /// Poll the transcript until the provider answers or the attempt budget
    /// is exhausted. Returns `Ok(None)` on exhaustion; the caller decides
    /// whether that is fatal.
    pub async fn poll_provider_message(&self, instance_id: &str) -> Result<Option<String>> {
        poll_loop(
            self.config.max_polls,
            Duration::from_millis(self.config.poll_interval_ms),
            || self.fetch_chat_messages(instance_id),
        )
        .await
    }
}

/// Bounded poll loop with an explicit attempt counter. No sleep before the
/// first attempt. Transport failures are logged and count as "no message
/// this round"; protocol failures abort immediately.
async fn poll_loop<F, Fut>(max_polls: u32, interval: Duration, mut fetch: F) -> Result<Option<String>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<ChatMessage>>>,
{
    for attempt in 0..max_polls {
        if attempt > 0 {
            tokio::time::sleep(interval).await;
        }

        let messages = match fetch().await {
            Ok(messages) => messages,
            Err(AnalysisError::Transport(error)) => {
                warn!(attempt = attempt + 1, %error, "Failed to poll agent.market");
                continue;
            }
            Err(other) => return Err(other),
        };

        if let Some(message) = latest_provider_message(&messages) {
            info!(attempt = attempt + 1, "Received provider response");
            return Ok(Some(message.to_string()));
        }
    }

    Ok(None)
}

/// The authoritative response: the provider-sent, non-empty message with
/// the greatest timestamp.
fn latest_provider_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .filter(|m| m.sender == "provider" && !m.message.is_empty())
        .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
        .map(|m| m.message.as_str())
}
