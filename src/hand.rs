//! Player and dealer hand representations and blackjack evaluation.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};

/// Evaluated total of a set of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandValue {
    /// Best total: the highest total not above 21 reachable by counting aces
    /// as 1, or the lowest bust total if none is.
    pub total: u32,
    /// Whether `total` still counts an ace as 11.
    pub soft: bool,
}

/// Evaluates cards under the soft/hard ace rule.
///
/// Every ace starts at 11; while the total exceeds 21 and an ace is still
/// counted as 11, that ace is softened to 1. An empty slice evaluates to 0.
#[must_use]
pub fn evaluate_cards(cards: &[Card]) -> HandValue {
    let mut total: u32 = 0;
    let mut aces: u32 = 0;

    for card in cards {
        if card.rank == Rank::Ace {
            aces += 1;
        }
        total += u32::from(card.rank.points());
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    HandValue {
        total,
        soft: aces > 0 && total <= 21,
    }
}

/// Blackjack value of `cards`.
#[must_use]
pub fn value(cards: &[Card]) -> u32 {
    evaluate_cards(cards).total
}

/// Whether `cards` count an ace as 11 in their best total.
#[must_use]
pub fn is_soft(cards: &[Card]) -> bool {
    evaluate_cards(cards).soft
}

/// Whether `cards` are a natural: exactly two cards worth 21.
#[must_use]
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && value(cards) == 21
}

/// Whether `cards` are worth more than 21.
#[must_use]
pub fn is_bust(cards: &[Card]) -> bool {
    value(cards) > 21
}

/// The player's hand. Cards are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Creates a new empty hand.
    #[must_use]
    pub const fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Adds a card to the hand.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Returns the cards in the hand.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Calculates the value of the hand.
    #[must_use]
    pub fn value(&self) -> u32 {
        value(&self.cards)
    }

    /// Returns whether the hand is soft (contains an ace counted as 11).
    #[must_use]
    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    /// Returns whether the hand is a natural blackjack.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    /// Returns whether the hand is bust.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        is_bust(&self.cards)
    }

    /// Returns the number of cards in the hand.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

/// The dealer's hand.
///
/// The engine always holds the real hole card (the second card dealt to the
/// dealer); `hole_revealed` only decides what a display may show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerHand {
    /// Cards in the hand.
    cards: Vec<Card>,
    /// Whether the hole card is revealed.
    hole_revealed: bool,
}

impl DealerHand {
    /// Creates a new empty dealer hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cards: Vec::new(),
            hole_revealed: false,
        }
    }

    /// Adds a card to the hand.
    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Returns all cards in the hand, hole card included.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns the visible card (first card).
    #[must_use]
    pub fn up_card(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// Returns the hole card.
    #[must_use]
    pub fn hole_card(&self) -> Option<&Card> {
        self.cards.get(1)
    }

    /// Returns whether the hole card is revealed.
    #[must_use]
    pub const fn is_hole_revealed(&self) -> bool {
        self.hole_revealed
    }

    /// Reveals the hole card.
    pub const fn reveal_hole(&mut self) {
        self.hole_revealed = true;
    }

    /// Whether the card at `index` must be rendered face down.
    #[must_use]
    pub const fn is_concealed(&self, index: usize) -> bool {
        index == 1 && !self.hole_revealed
    }

    /// Calculates the visible value (only up card if hole not revealed).
    #[must_use]
    pub fn visible_value(&self) -> u32 {
        if self.hole_revealed {
            self.value()
        } else {
            self.cards.first().map_or(0, |c| u32::from(c.rank.points()))
        }
    }

    /// Calculates the full value of the hand.
    #[must_use]
    pub fn value(&self) -> u32 {
        value(&self.cards)
    }

    /// Returns whether the hand is a blackjack.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    /// Returns whether the hand is bust.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        is_bust(&self.cards)
    }

    /// Returns whether the hand is soft (contains an ace counted as 11).
    #[must_use]
    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    /// Returns the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
