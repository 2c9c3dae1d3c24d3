//! Card sources: where a round's shuffled deck comes from.
//!
//! The engine only needs two calls, [`CardSource::new_shuffled_deck`] and
//! [`CardSource::draw`]. [`LocalDeckService`] shuffles in process;
//! [`RemoteDeckService`] talks to a deck-of-cards style HTTP service through
//! an injected [`Transport`].

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::SourceError;

mod local;
mod remote;
pub mod wire;

pub use local::LocalDeckService;
pub use remote::{DEFAULT_BASE_URL, RemoteDeckService, Transport};

/// Opaque identifier of a shuffled deck held by a card source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    /// Wraps a source-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A service that issues shuffled decks and draws cards from them without
/// replacement.
pub trait CardSource {
    /// Creates and shuffles a new deck made of `deck_count` standard decks.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the source cannot issue a deck.
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError>;

    /// Draws exactly `count` cards from the top of `deck`, in draw order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::DeckExhausted`] if fewer than `count` cards
    /// remain, or [`SourceError::Unavailable`] on transport failure.
    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError>;

    /// Tells the source `deck` will not be drawn from again.
    ///
    /// Sources that keep decks in memory free them here. The default does
    /// nothing.
    fn release(&self, deck: &DeckId) {
        let _ = deck;
    }
}

impl<T: CardSource + ?Sized> CardSource for &T {
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError> {
        (**self).new_shuffled_deck(deck_count)
    }

    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        (**self).draw(deck, count)
    }

    fn release(&self, deck: &DeckId) {
        (**self).release(deck);
    }
}
