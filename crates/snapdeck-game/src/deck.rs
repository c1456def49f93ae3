//! Deck generation, shuffling, and dealing.

use rand::Rng;
use rand::seq::SliceRandom;

use snapdeck_protocol::{Card, Character, Style};

/// Total cards in a deck: 13 characters × 4 styles.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to each player. The deck size is even, so the split is
/// always exact.
pub const HAND_SIZE: usize = DECK_SIZE / 2;

/// A full 52-card deck.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Generates the fixed roster in deterministic style-major order.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for style in Style::ALL {
            for character in Character::ALL {
                cards.push(Card::new(character, style));
            }
        }
        Self { cards }
    }

    /// Shuffles in place with a uniform Fisher–Yates permutation.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    /// Splits the deck at the midpoint: first half to the first-registered
    /// player, second half to the second.
    pub fn deal(mut self) -> (Vec<Card>, Vec<Card>) {
        let second = self.cards.split_off(HAND_SIZE);
        (self.cards, second)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
