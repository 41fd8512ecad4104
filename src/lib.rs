//! Clau Advisor
//!
//! A conversational financial-advice client that:
//! - Keeps one canonical, append-only conversation log per session
//! - Re-derives analytics (message counts, topic histogram, income and
//!   net worth) from the full log after every mutation
//! - Fans snapshots out to any number of subscribers (chat, dashboard, insights)
//! - Talks to a remote advice backend over HTTP
//!
//! FLOW:
//! CONSUMER → APPEND → RECOMPUTE → NOTIFY SUBSCRIBERS

pub mod api;
pub mod backend;
pub mod chat;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extractor;
pub mod insights;
pub mod models;
pub mod render;
pub mod state;

pub use error::Result;

// Re-export common types
pub use classifier::TopicClassifier;
pub use models::*;
pub use state::{ConversationStore, SharedStore, Subscription};
