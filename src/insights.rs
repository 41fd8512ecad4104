//! Insights surface
//!
//! Asks the advice backend for a one-off summary of the conversation so
//! far. The store is only read; nothing is appended.

use crate::backend::{AdviceBackend, Content, Role};
use crate::models::{Message, Sender};
use crate::render::markdown_to_html;
use crate::state::SharedStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub const NO_INSIGHTS_REPLY: &str = "Could not generate insights.";

pub const INSIGHTS_ERROR_HTML: &str =
    "<h3>Error</h3><p>Sorry, we could not generate insights at this time. Please try again later.</p>";

const BOT_DISPLAY_NAME: &str = "Clau AI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightsOutcome {
    NoConversation,
    /// Another generation is still running
    Busy,
    Generated { html: String },
    Failed { html: String },
}

/// Clears the in-progress flag on every exit path, including cancellation
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct InsightsGenerator {
    store: SharedStore,
    backend: Arc<dyn AdviceBackend>,
    in_progress: AtomicBool,
}

impl InsightsGenerator {
    pub fn new(store: SharedStore, backend: Arc<dyn AdviceBackend>) -> Self {
        Self {
            store,
            backend,
            in_progress: AtomicBool::new(false),
        }
    }

    pub async fn has_conversation(&self) -> bool {
        !self.store.lock().await.current_log().is_empty()
    }

    pub async fn generate(&self) -> InsightsOutcome {
        let transcript = {
            let store = self.store.lock().await;
            if store.current_log().is_empty() {
                return InsightsOutcome::NoConversation;
            }
            format_transcript(store.current_log())
        };

        if self.in_progress.swap(true, Ordering::SeqCst) {
            return InsightsOutcome::Busy;
        }
        let _guard = InProgressGuard(&self.in_progress);

        info!(chars = transcript.len(), "Requesting conversation insights");

        let contents = vec![Content::text(Role::User, build_insights_prompt(&transcript))];
        match self.backend.ask(contents).await {
            Ok(answer) => {
                let text = answer.unwrap_or_else(|| NO_INSIGHTS_REPLY.to_string());
                InsightsOutcome::Generated {
                    html: markdown_to_html(&text),
                }
            }
            Err(e) => {
                warn!("Failed to generate insights: {}", e);
                InsightsOutcome::Failed {
                    html: INSIGHTS_ERROR_HTML.to_string(),
                }
            }
        }
    }
}

/// One `Speaker: text` line per message
fn format_transcript(log: &[Message]) -> String {
    log.iter()
        .map(|msg| {
            let speaker = match msg.sender {
                Sender::User => "User",
                Sender::Bot => BOT_DISPLAY_NAME,
            };
            format!("{}: {}", speaker, msg.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_insights_prompt(transcript: &str) -> String {
    format!(
        "Based on the following financial conversation, please provide a high-level summary of insights. \
Analyze the user's goals, potential areas for improvement, and key topics discussed. \
Format your response clearly using Markdown with headings like \"Key Goals\", \"Topics Discussed\", and \"Actionable Insights\".\n\n\
---CONVERSATION---\n{}",
        transcript
    )
}
