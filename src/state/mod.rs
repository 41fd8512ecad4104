//! Conversation state
//!
//! Owns the canonical message log and every aggregate derived from it.
//! Aggregates are recomputed from the full log on each mutation, and every
//! live subscriber is handed one snapshot per mutation, in mutation order.

use crate::classifier::TopicClassifier;
use crate::extractor;
use crate::models::{Aggregates, Message, Sender, Snapshot};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::sync::Mutex;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg(test)]
mod proptests;

/// Snapshots a subscriber may leave unread before it is dropped
pub const SUBSCRIBER_BACKLOG: usize = 256;

/// A store shared between consumers. Never hold the lock across an `.await`.
pub type SharedStore = Arc<Mutex<ConversationStore>>;

impl Aggregates {
    /// Recompute every aggregate from scratch
    pub fn from_log(log: &[Message]) -> Self {
        let mut aggregates = Aggregates::default();

        for msg in log {
            match msg.sender {
                Sender::User => {
                    aggregates.user_message_count += 1;

                    // Latest match overrides earlier ones
                    let figures = extractor::extract(&msg.text);
                    if let Some(income) = figures.income {
                        aggregates.total_income = income;
                    }
                    if let Some(net_worth) = figures.net_worth {
                        aggregates.net_worth = net_worth;
                    }
                }
                Sender::Bot => {
                    aggregates.bot_message_count += 1;
                    if let Some(topic) = TopicClassifier::classify(&msg.text) {
                        aggregates.topic_counts.increment(topic);
                    }
                }
            }
        }

        aggregates
    }
}

struct Subscriber {
    id: Uuid,
    tx: mpsc::Sender<Arc<Snapshot>>,
}

/// Single source of truth for one conversation
pub struct ConversationStore {
    log: Arc<Vec<Message>>,
    aggregates: Aggregates,
    is_loading: bool,
    subscribers: Vec<Subscriber>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Vec::new()),
            aggregates: Aggregates::default(),
            is_loading: false,
            subscribers: Vec::new(),
        }
    }

    /// Wrap a fresh store for sharing between consumers
    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Append a message, recompute aggregates, notify subscribers
    pub fn append(&mut self, message: Message) {
        debug!(
            sender = ?message.sender,
            message_id = %message.message_id,
            "Appending message"
        );

        Arc::make_mut(&mut self.log).push(message);
        self.aggregates = Aggregates::from_log(&self.log);
        self.notify();
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
        self.notify();
    }

    /// Empty the log and zero every aggregate in one step
    pub fn reset(&mut self) {
        debug!(cleared = self.log.len(), "Resetting conversation");

        self.log = Arc::new(Vec::new());
        self.aggregates = Aggregates::default();
        self.notify();
    }

    pub fn current_log(&self) -> &[Message] {
        &self.log
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(Arc::clone(&self.log), &self.aggregates, self.is_loading)
    }

    /// Register a subscriber; the current snapshot is queued immediately.
    ///
    /// A subscriber that falls more than [`SUBSCRIBER_BACKLOG`] snapshots
    /// behind is dropped; its subscription ends after the queued snapshots.
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BACKLOG);
        let id = Uuid::new_v4();

        // Fresh channel with room, send cannot fail here
        let _ = tx.try_send(Arc::new(self.snapshot()));
        self.subscribers.push(Subscriber { id, tx });

        debug!(subscriber_id = %id, total = self.subscribers.len(), "Subscriber registered");

        Subscription { id, rx }
    }

    /// Live subscribers; disposed handles are pruned on the next notification
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|s| !s.tx.is_closed()).count()
    }

    fn notify(&mut self) {
        let snapshot = Arc::new(self.snapshot());

        self.subscribers.retain(|subscriber| match subscriber.tx.try_send(Arc::clone(&snapshot)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    subscriber_id = %subscriber.id,
                    backlog = SUBSCRIBER_BACKLOG,
                    "Dropping subscriber that stopped reading"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber_id = %subscriber.id, "Dropping disposed subscriber");
                false
            }
        });
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`ConversationStore::subscribe`]. Dropping it stops delivery.
pub struct Subscription {
    id: Uuid,
    rx: mpsc::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next snapshot; `None` once the store is gone
    pub async fn recv(&mut self) -> Option<Arc<Snapshot>> {
        self.rx.recv().await
    }

    /// Next queued snapshot without waiting
    pub fn try_recv(&mut self) -> Option<Arc<Snapshot>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything queued so far
    pub fn drain(&mut self) -> Vec<Arc<Snapshot>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn into_stream(self) -> ReceiverStream<Arc<Snapshot>> {
        ReceiverStream::new(self.rx)
    }
}
