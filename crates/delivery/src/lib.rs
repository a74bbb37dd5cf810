//! Delivery client for the Telegram bot API.
//!
//! A single-attempt primitive: one `send` call issues one HTTP POST and
//! classifies the outcome. All retry and backoff policy lives in the
//! dispatch queue, keeping the two concerns independently testable.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use relay_common::types::DeliveryOutcome;

/// Connect and overall request timeout for one delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of an error response body is kept for diagnostics.
const ERROR_SNIPPET_CHARS: usize = 200;

/// Something that can deliver one formatted notification to a chat.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn send(&self, token: &str, chat_id: &str, text: &str) -> DeliveryOutcome;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// HTTP client for the bot API's `sendMessage` endpoint.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
}

impl TelegramClient {
    /// `api_base` is normally `https://api.telegram.org`; tests point it at
    /// a local mock server.
    pub fn new(api_base: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Deliverer for TelegramClient {
    async fn send(&self, token: &str, chat_id: &str, text: &str) -> DeliveryOutcome {
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = match self.http.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                // The token is embedded in the URL path; strip it before the
                // error string can reach logs or job records.
                let reason = format!("transport error: {}", e.without_url());
                tracing::warn!(chat_id, %reason, "Delivery attempt failed before a response");
                return DeliveryOutcome::Retryable(reason);
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::debug!(chat_id, "Message delivered");
            return DeliveryOutcome::Success;
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
        let reason = format!("HTTP {}: {}", status.as_u16(), snippet);

        // 429 and 5xx resolve with time; any other non-2xx is a caller error
        // that retrying cannot fix.
        if status.as_u16() == 429 || status.is_server_error() {
            tracing::warn!(chat_id, %status, "Retryable delivery failure");
            DeliveryOutcome::Retryable(reason)
        } else {
            tracing::error!(chat_id, %status, "Fatal delivery failure");
            DeliveryOutcome::Fatal(reason)
        }
    }
}
