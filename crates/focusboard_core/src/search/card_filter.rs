//! Regex card filter.

use crate::model::card::Card;
use regex::Regex;

/// Compiled search pattern matched against card title and content.
#[derive(Debug, Clone)]
pub struct CardFilter {
    pattern: Regex,
}

impl CardFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.pattern.is_match(&card.title) || self.pattern.is_match(&card.content)
    }

    /// Keeps matching cards, preserving input order.
    pub fn apply<'a>(&self, cards: Vec<&'a Card>) -> Vec<&'a Card> {
        cards.into_iter().filter(|card| self.matches(card)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::CardFilter;
    use crate::model::card::Card;

    #[test]
    fn matches_title_or_content_and_keeps_order() {
        let a = Card::new("Write report", "");
        let b = Card::new("Groceries", "remember the report draft");
        let c = Card::new("Gym", "legs");
        let filter = CardFilter::new("(?i)report").unwrap();

        let found = filter.apply(vec![&a, &b, &c]);
        let ids: Vec<_> = found.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(CardFilter::new("(unclosed").is_err());
    }
}
