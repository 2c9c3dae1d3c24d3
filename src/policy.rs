//! Dealer drawing policy.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::hand::evaluate_cards;

/// How aggressively the dealer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Dealer draws below 16.
    Easy,
    /// Dealer draws below 17 and stands on every 17.
    #[default]
    Normal,
    /// Dealer draws below 17 and also hits soft 17.
    Hard,
}

impl Difficulty {
    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown difficulty name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_owned())),
        }
    }
}

/// Whether the dealer must draw another card.
///
/// A bust hand never draws. Above 17 nothing draws; exactly 17 draws only on
/// [`Difficulty::Hard`] when the 17 is soft.
#[must_use]
pub fn must_draw(dealer: &[Card], difficulty: Difficulty) -> bool {
    let value = evaluate_cards(dealer);
    if value.total > 21 {
        return false;
    }

    match difficulty {
        Difficulty::Easy => value.total < 16,
        Difficulty::Normal => value.total < 17,
        Difficulty::Hard => value.total < 17 || (value.total == 17 && value.soft),
    }
}
