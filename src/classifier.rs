//! Topic Classifier
//!
//! Maps a bot reply to at most one entry of the fixed topic taxonomy.
//! Keyword groups are checked in priority order and the first group with
//! a substring hit wins:
//! - Personal Finance → Investments → Financial Planning → Financial Literacy → Market Trends

use crate::models::Topic;

/// Static keyword groups in priority order — zero allocation
const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::PersonalFinance, &["budget", "saving", "debt"]),
    (Topic::Investments, &["stock", "bond", "ira", "401k"]),
    (Topic::FinancialPlanning, &["retirement", "college"]),
    (Topic::FinancialLiteracy, &["interest", "apr", "loan"]),
    (Topic::MarketTrends, &["market", "trend", "economic"]),
];

/// Topic classifier
pub struct TopicClassifier;

impl TopicClassifier {
    /// Classify a bot utterance; `None` when no keyword group matches
    pub fn classify(text: &str) -> Option<Topic> {
        let text = text.to_lowercase();

        TOPIC_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
            .map(|(topic, _)| *topic)
    }
}
