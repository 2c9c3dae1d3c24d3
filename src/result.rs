//! Round result types.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::score::Score;

/// How a round ended for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Player wins (natural blackjack, dealer busts or higher value).
    Win,
    /// Player loses (player busts or dealer has higher value).
    Lose,
    /// Equal values.
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Draw => "draw",
        })
    }
}

/// Compares two non-natural final hands.
///
/// A player bust loses whatever the dealer holds; otherwise a dealer bust
/// wins, and the higher value takes the round.
#[must_use]
pub fn settle(player_value: u32, dealer_value: u32) -> Outcome {
    if player_value > 21 {
        Outcome::Lose
    } else if dealer_value > 21 || player_value > dealer_value {
        Outcome::Win
    } else if player_value < dealer_value {
        Outcome::Lose
    } else {
        Outcome::Draw
    }
}

/// Human-readable message for a finished round.
#[must_use]
pub const fn result_message(
    outcome: Outcome,
    player_blackjack: bool,
    player_bust: bool,
    dealer_bust: bool,
) -> &'static str {
    match outcome {
        Outcome::Win if player_blackjack => "Blackjack! You win.",
        Outcome::Win if dealer_bust => "Dealer busts. You win.",
        Outcome::Win => "You win.",
        Outcome::Lose if player_bust => "Bust! You lose.",
        Outcome::Lose => "You lose.",
        Outcome::Draw => "Push.",
    }
}

/// Result of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    /// The round outcome.
    pub outcome: Outcome,
    /// The player's final hand value.
    pub player_value: u32,
    /// The dealer's final hand value.
    pub dealer_value: u32,
    /// Whether the player was dealt a natural blackjack.
    pub player_blackjack: bool,
    /// Whether the player busted.
    pub player_bust: bool,
    /// Whether the dealer busted.
    pub dealer_bust: bool,
    /// Score after this round was recorded.
    pub score: Score,
    /// Set when the score could not be persisted. `score` is still current.
    pub persistence_error: Option<PersistenceError>,
}

impl RoundResult {
    /// Human-readable result message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        result_message(
            self.outcome,
            self.player_blackjack,
            self.player_bust,
            self.dealer_bust,
        )
    }
}
