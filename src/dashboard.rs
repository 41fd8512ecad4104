//! Dashboard surface: a read-only projection of a store snapshot.

use crate::models::{Snapshot, Topic};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRow {
    pub topic: Topic,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub total_income: f64,
    pub net_worth: f64,
    pub user_message_count: usize,
    pub bot_message_count: usize,
    pub total_messages: usize,
    /// One row per taxonomy entry, in taxonomy order
    pub topics: Vec<TopicRow>,
    pub is_loading: bool,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            total_income: snapshot.total_income,
            net_worth: snapshot.net_worth,
            user_message_count: snapshot.user_message_count,
            bot_message_count: snapshot.bot_message_count,
            total_messages: snapshot.user_message_count + snapshot.bot_message_count,
            topics: Topic::ALL
                .iter()
                .map(|topic| TopicRow {
                    topic: *topic,
                    count: snapshot.topic_counts.get(*topic),
                })
                .collect(),
            is_loading: snapshot.is_loading,
        }
    }
}
