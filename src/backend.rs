//! Advice backend client
//!
//! The backend takes the whole conversation as role-tagged turns and
//! answers with a single text. Uses a long-lived reqwest::Client for
//! connection pooling.

use crate::error::AdvisorError;
use crate::models::{Message, Sender};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Role of a turn as the backend expects it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            Sender::Bot => Role::Model,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

/// Full history in log order
pub fn contents_from_log(log: &[Message]) -> Vec<Content> {
    log.iter()
        .map(|msg| Content::text(msg.sender.into(), msg.text.as_str()))
        .collect()
}

/// Anything that can answer a conversation
#[async_trait::async_trait]
pub trait AdviceBackend: Send + Sync {
    /// `Ok(None)` when the backend replied without an answer
    async fn ask(&self, contents: Vec<Content>) -> crate::Result<Option<String>>;
}

/// Reusable HTTP backend (connection-pooled)
pub struct HttpAdviceBackend {
    client: Client,
    ask_url: String,
}

impl HttpAdviceBackend {
    pub fn new(backend_url: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            ask_url: format!("{}/ask", backend_url.trim_end_matches('/')),
        })
    }

    pub fn ask_url(&self) -> &str {
        &self.ask_url
    }
}

#[async_trait::async_trait]
impl AdviceBackend for HttpAdviceBackend {
    async fn ask(&self, contents: Vec<Content>) -> crate::Result<Option<String>> {
        let turns = contents.len();
        let request = AskRequest { contents };

        info!(url = %self.ask_url, turns, "Calling advice backend");

        let response = self
            .client
            .post(&self.ask_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Advice backend request failed: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Advice backend error response: {}", body);
            return Err(AdvisorError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: AskResponse = serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse advice backend response: {}", e);
            e
        })?;

        info!(answered = parsed.answer.is_some(), "Advice backend response received");

        Ok(parsed.answer)
    }
}
