//! Game configuration options.

use serde::{Deserialize, Serialize};

use crate::error::DealError;
use crate::policy::Difficulty;

/// Largest deck count the start form accepts.
pub const MAX_DECKS: u8 = 8;

/// Configuration chosen when a game starts.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use bjtable::{Difficulty, GameOptions};
///
/// let options = GameOptions::default()
///     .with_decks(6)
///     .with_difficulty(Difficulty::Hard);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Number of decks shuffled together for each round.
    pub decks: u8,
    /// Dealer drawing policy.
    pub difficulty: Difficulty,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            decks: 1,
            difficulty: Difficulty::Normal,
        }
    }
}

impl GameOptions {
    /// Sets the number of decks.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::GameOptions;
    ///
    /// let options = GameOptions::default().with_decks(6);
    /// assert_eq!(options.decks, 6);
    /// ```
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = decks;
        self
    }

    /// Sets the dealer difficulty.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::{Difficulty, GameOptions};
    ///
    /// let options = GameOptions::default().with_difficulty(Difficulty::Easy);
    /// assert_eq!(options.difficulty, Difficulty::Easy);
    /// ```
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Checks the options before a game starts.
    ///
    /// # Errors
    ///
    /// Returns [`DealError::InvalidDeckCount`] unless `decks` is in `1..=8`.
    pub fn validate(&self) -> Result<(), DealError> {
        if self.decks == 0 || self.decks > MAX_DECKS {
            return Err(DealError::InvalidDeckCount(self.decks));
        }
        Ok(())
    }
}
