//! Financial Extractor
//!
//! Scans a user utterance for income and net-worth figures.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INCOME_RE: Regex =
        Regex::new(r"(?i)(?:i earn|my income is|i make)\s*\$?([0-9,]+(\.[0-9]{1,2})?)")
            .expect("income pattern is valid");
    static ref NET_WORTH_RE: Regex =
        Regex::new(r"(?i)(?:net worth is|my net worth is)\s*\$?([0-9,]+(\.[0-9]{1,2})?)")
            .expect("net worth pattern is valid");
}

/// Figures found in a single utterance. `None` means the pattern did not match.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialFigures {
    pub income: Option<f64>,
    pub net_worth: Option<f64>,
}

impl FinancialFigures {
    pub fn is_empty(&self) -> bool {
        self.income.is_none() && self.net_worth.is_none()
    }
}

/// Extract income and net worth from user text
pub fn extract(text: &str) -> FinancialFigures {
    FinancialFigures {
        income: first_amount(&INCOME_RE, text),
        net_worth: first_amount(&NET_WORTH_RE, text),
    }
}

/// First capture only; thousands separators stripped before parsing
fn first_amount(pattern: &Regex, text: &str) -> Option<f64> {
    let raw = pattern.captures(text)?.get(1)?.as_str();
    let digits: String = raw.chars().filter(|c| *c != ',').collect();

    // A bare run of separators captures but carries no number
    digits.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_phrases() {
        assert_eq!(extract("I earn $3,000 a month").income, Some(3000.0));
        assert_eq!(extract("i earn 2500.50").income, Some(2500.5));
        assert_eq!(extract("My income is 85,000").income, Some(85000.0));
        assert_eq!(extract("I MAKE $1,234,567.89").income, Some(1_234_567.89));
    }

    #[test]
    fn test_net_worth_phrases() {
        assert_eq!(extract("My net worth is 50,000").net_worth, Some(50000.0));
        assert_eq!(extract("I think my net worth is $12.5").net_worth, Some(12.5));
    }

    #[test]
    fn test_both_patterns_in_one_message() {
        let figures = extract("I make 4,000 and my net worth is 20,000");
        assert_eq!(figures.income, Some(4000.0));
        assert_eq!(figures.net_worth, Some(20000.0));
    }

    #[test]
    fn test_first_match_only() {
        assert_eq!(extract("I earn 100, well I earn 200").income, Some(100.0));
    }

    #[test]
    fn test_non_matches() {
        assert!(extract("How should I budget?").is_empty());
        assert!(extract("I earn a lot").is_empty());
        assert_eq!(extract("I earn ,, per hour").income, None);
    }

    #[test]
    fn test_cents_limited_to_two_digits() {
        // Only the first two fractional digits belong to the amount
        assert_eq!(extract("I earn 10.999").income, Some(10.99));
    }
}
