//! Round state types.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::PersistenceError;
use crate::hand::{DealerHand, Hand};
use crate::policy::Difficulty;
use crate::result::{Outcome, RoundResult, result_message};
use crate::score::Score;
use crate::source::DeckId;

/// Whose move it is. A resolved round carries its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    /// Waiting for the player to hit or stand.
    PlayerTurn,
    /// Dealer plays out their hand.
    DealerTurn,
    /// Round has ended.
    Resolved(Outcome),
}

impl Turn {
    /// The outcome, present only once resolved.
    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Resolved(outcome) => Some(outcome),
            Self::PlayerTurn | Self::DealerTurn => None,
        }
    }
}

/// The live state of one round.
///
/// Both hands are non-empty from the deal on, and all cards come from
/// `deck_id`. Once resolved the round is never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    /// Ticket this round was dealt under.
    pub(super) ticket: u64,
    pub(super) deck_id: DeckId,
    pub(super) difficulty: Difficulty,
    pub(super) player: Hand,
    pub(super) dealer: DealerHand,
    pub(super) turn: Turn,
}

impl RoundState {
    /// Builds a freshly dealt round from the first four cards of a deck:
    /// player, dealer up card, player, dealer hole card.
    pub(super) fn deal(
        ticket: u64,
        deck_id: DeckId,
        difficulty: Difficulty,
        [first, up, second, hole]: [Card; 4],
    ) -> Self {
        let mut dealer = DealerHand::new();
        dealer.add_card(up);
        dealer.add_card(hole);

        Self {
            ticket,
            deck_id,
            difficulty,
            player: [first, second].into_iter().collect(),
            dealer,
            turn: Turn::PlayerTurn,
        }
    }

    /// Deck every card of this round is drawn from.
    #[must_use]
    pub const fn deck_id(&self) -> &DeckId {
        &self.deck_id
    }

    /// Dealer policy in force for this round.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The player's hand.
    #[must_use]
    pub const fn player(&self) -> &Hand {
        &self.player
    }

    /// The dealer's hand, hole card included.
    #[must_use]
    pub const fn dealer(&self) -> &DealerHand {
        &self.dealer
    }

    /// Current turn.
    #[must_use]
    pub const fn turn(&self) -> Turn {
        self.turn
    }

    /// Outcome, once resolved.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.turn.outcome()
    }

    /// Returns whether the round has ended.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.turn, Turn::Resolved(_))
    }

    /// The dealer's hand only counts once the player is still standing.
    fn dealer_bust(&self) -> bool {
        !self.player.is_bust() && self.dealer.is_bust()
    }

    /// Human-readable result, once resolved.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        self.outcome().map(|outcome| {
            result_message(
                outcome,
                self.player.is_blackjack(),
                self.player.is_bust(),
                self.dealer_bust(),
            )
        })
    }

    pub(super) fn summary(
        &self,
        outcome: Outcome,
        score: Score,
        persistence_error: Option<PersistenceError>,
    ) -> RoundResult {
        RoundResult {
            outcome,
            player_value: self.player.value(),
            dealer_value: self.dealer.value(),
            player_blackjack: self.player.is_blackjack(),
            player_bust: self.player.is_bust(),
            dealer_bust: self.dealer_bust(),
            score,
            persistence_error,
        }
    }
}
