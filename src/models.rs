//! Core data models for the advice client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Fixed topic taxonomy applied to bot messages.
///
/// Variant order is classifier priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    #[serde(rename = "Personal Finance")]
    PersonalFinance,
    #[serde(rename = "Investments")]
    Investments,
    #[serde(rename = "Financial Planning")]
    FinancialPlanning,
    #[serde(rename = "Financial Literacy")]
    FinancialLiteracy,
    #[serde(rename = "Market Trends")]
    MarketTrends,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::PersonalFinance,
        Topic::Investments,
        Topic::FinancialPlanning,
        Topic::FinancialLiteracy,
        Topic::MarketTrends,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::PersonalFinance => "Personal Finance",
            Topic::Investments => "Investments",
            Topic::FinancialPlanning => "Financial Planning",
            Topic::FinancialLiteracy => "Financial Literacy",
            Topic::MarketTrends => "Market Trends",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

//
// ================= Message =================
//

/// One entry of the conversation log. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Pre-rendered markup for display surfaces; opaque to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderable_html: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, renderable_html: Option<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            text: text.into(),
            sender,
            renderable_html,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text, None)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text, None)
    }

    pub fn bot_with_html(text: impl Into<String>, html: String) -> Self {
        Self::new(Sender::Bot, text, Some(html))
    }
}

//
// ================= Aggregates =================
//

/// Per-topic bot message counts. Every taxonomy entry is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Topic, u32>", into = "BTreeMap<Topic, u32>")]
pub struct TopicCounts(BTreeMap<Topic, u32>);

impl TopicCounts {
    pub fn new() -> Self {
        Self(Topic::ALL.iter().map(|topic| (*topic, 0)).collect())
    }

    pub fn get(&self, topic: Topic) -> u32 {
        self.0.get(&topic).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, topic: Topic) {
        *self.0.entry(topic).or_insert(0) += 1;
    }

    /// Iterate in taxonomy order
    pub fn iter(&self) -> impl Iterator<Item = (Topic, u32)> + '_ {
        self.0.iter().map(|(topic, count)| (*topic, *count))
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

impl Default for TopicCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<Topic, u32>> for TopicCounts {
    fn from(map: BTreeMap<Topic, u32>) -> Self {
        let mut counts = Self::new();
        counts.0.extend(map);
        counts
    }
}

impl From<TopicCounts> for BTreeMap<Topic, u32> {
    fn from(counts: TopicCounts) -> Self {
        counts.0
    }
}

/// Everything derived from the log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub user_message_count: usize,
    pub bot_message_count: usize,
    pub topic_counts: TopicCounts,
    pub total_income: f64,
    pub net_worth: f64,
}

//
// ================= Snapshot =================
//

/// Payload delivered to subscribers on every store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub log: Arc<Vec<Message>>,
    pub user_message_count: usize,
    pub bot_message_count: usize,
    pub topic_counts: TopicCounts,
    pub total_income: f64,
    pub net_worth: f64,
    pub is_loading: bool,
}

impl Snapshot {
    pub fn new(log: Arc<Vec<Message>>, aggregates: &Aggregates, is_loading: bool) -> Self {
        Self {
            log,
            user_message_count: aggregates.user_message_count,
            bot_message_count: aggregates.bot_message_count,
            topic_counts: aggregates.topic_counts.clone(),
            total_income: aggregates.total_income,
            net_worth: aggregates.net_worth,
            is_loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_counts_zero_initialized() {
        let counts = TopicCounts::new();
        assert_eq!(counts.iter().count(), 5);
        assert!(counts.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_topic_counts_serialize_with_labels() {
        let mut counts = TopicCounts::new();
        counts.increment(Topic::MarketTrends);

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["Market Trends"], 1);
        assert_eq!(json["Personal Finance"], 0);
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_topic_counts_deserialize_fills_missing_keys() {
        let counts: TopicCounts = serde_json::from_str(r#"{"Investments": 2}"#).unwrap();
        assert_eq!(counts.get(Topic::Investments), 2);
        assert_eq!(counts.get(Topic::FinancialLiteracy), 0);
        assert_eq!(counts.iter().count(), 5);
    }

    #[test]
    fn test_message_wire_shape() {
        let msg = Message::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["text"], "hello");
        assert!(json.get("renderableHtml").is_none());
    }
}
