//! Chat surface
//!
//! Appends user messages to the shared store, asks the advice backend with
//! the full history, and appends the reply (or a fixed error reply) as a
//! bot message. Overlapping sends are allowed; replies land in arrival order.

use crate::backend::{contents_from_log, AdviceBackend};
use crate::models::Message;
use crate::render::markdown_to_html;
use crate::state::{ConversationStore, SharedStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Bot reply used when the backend cannot be reached or misbehaves
pub const CHAT_ERROR_REPLY: &str =
    "Sorry, an error occurred while contacting the advice service. Please try again later.";

/// Bot reply used when the backend answers without an `answer` field
pub const NO_ANSWER_REPLY: &str = "No answer received.";

/// Canned questions offered by chat surfaces
pub const QUICK_PROMPTS: &[&str] = &[
    "What is APR?",
    "How do I start a budget?",
    "Should I invest in stocks or bonds?",
    "How much should I save for retirement?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was appended
    Ignored,
    Answered,
    /// The backend failed and the error reply was appended
    Failed,
}

pub struct ChatSession {
    store: SharedStore,
    backend: Arc<dyn AdviceBackend>,
    in_flight: Arc<AtomicUsize>,
}

/// Tracks one outstanding backend request.
///
/// Released under the store lock on completion. If the request is dropped
/// first, the counter is decremented immediately and the loading flag is
/// refreshed on a spawned task.
struct InFlightGuard {
    store: SharedStore,
    in_flight: Arc<AtomicUsize>,
    released: bool,
}

impl InFlightGuard {
    fn acquire(store: &mut ConversationStore, shared: &SharedStore, in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        store.set_loading(true);
        Self {
            store: Arc::clone(shared),
            in_flight: Arc::clone(in_flight),
            released: false,
        }
    }

    fn release(mut self, store: &mut ConversationStore) {
        self.released = true;
        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        store.set_loading(remaining > 0);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        warn!("Chat request abandoned before the backend replied");

        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut store = store.lock().await;
                    store.set_loading(in_flight.load(Ordering::SeqCst) > 0);
                });
            }
            Err(_) => {
                if let Ok(mut store) = store.try_lock() {
                    store.set_loading(in_flight.load(Ordering::SeqCst) > 0);
                }
            }
        }
    }
}

impl ChatSession {
    pub fn new(store: SharedStore, backend: Arc<dyn AdviceBackend>) -> Self {
        Self {
            store,
            backend,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Dropping the returned future before it resolves leaves the user
    /// message in the log without a reply and lowers the loading flag.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        let (guard, contents) = {
            let mut store = self.store.lock().await;
            store.append(Message::user(text));
            let guard = InFlightGuard::acquire(&mut store, &self.store, &self.in_flight);
            (guard, contents_from_log(store.current_log()))
        };

        info!(turns = contents.len(), "Sending conversation to advice backend");

        let (reply, outcome) = match self.backend.ask(contents).await {
            Ok(answer) => {
                let text = answer.unwrap_or_else(|| NO_ANSWER_REPLY.to_string());
                let html = markdown_to_html(&text);
                (Message::bot_with_html(text, html), SendOutcome::Answered)
            }
            Err(e) => {
                warn!("Advice backend call failed: {}", e);
                (Message::bot(CHAT_ERROR_REPLY), SendOutcome::Failed)
            }
        };

        let mut store = self.store.lock().await;
        store.append(reply);
        guard.release(&mut store);

        outcome
    }

    pub async fn send_quick_message(&self, prompt: &str) -> SendOutcome {
        self.send_message(prompt).await
    }

    pub async fn clear_chat(&self) {
        self.store.lock().await.reset();
        info!("Chat cleared");
    }
}
