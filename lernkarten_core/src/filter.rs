//! Card filtering and ordering for listings and drill decks.

use crate::ident::id_sort_key;
use crate::{Card, CardCategory, CardType};

/// Conjunctive filter; unset fields match everything
#[derive(Clone, Debug, Default)]
pub struct CardFilter {
    /// Exact topic, compared case-insensitively
    pub topic: Option<String>,
    pub card_type: Option<CardType>,
    pub category: Option<CardCategory>,
    /// Case-insensitive substring of title or content
    pub search: Option<String>,
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        if let Some(ref topic) = self.topic {
            if card.topic.to_lowercase() != topic.to_lowercase() {
                return false;
            }
        }
        if let Some(ref card_type) = self.card_type {
            if &card.card_type != card_type {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &card.category != category {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !card.title.to_lowercase().contains(&needle)
                && !card.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Matching cards, sorted by id
    pub fn apply<'a>(&self, cards: &'a [Card]) -> Vec<&'a Card> {
        let mut selected: Vec<_> = cards.iter().filter(|c| self.matches(c)).collect();
        selected.sort_by(|a, b| id_sort_key(&a.id).cmp(&id_sort_key(&b.id)));
        selected
    }
}
