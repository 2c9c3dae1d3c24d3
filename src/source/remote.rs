use crate::card::Card;
use crate::error::SourceError;

use super::{CardSource, DeckId, wire};

/// Base URL of the public deck-of-cards service.
pub const DEFAULT_BASE_URL: &str = "https://deckofcardsapi.com/api/deck";

/// Minimal HTTP GET capability used by [`RemoteDeckService`].
///
/// Implementations resolve `path` against their base URL and return the
/// response body. Any transport failure or non-2xx status is reported as
/// [`SourceError::Unavailable`].
pub trait Transport {
    /// Performs a GET request for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] when the request fails.
    fn get(&self, path: &str) -> Result<String, SourceError>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String, SourceError>,
{
    fn get(&self, path: &str) -> Result<String, SourceError> {
        self(path)
    }
}

/// Card source backed by a deck-of-cards HTTP service.
///
/// Calls are single attempts; retrying is up to the caller.
#[derive(Debug, Clone)]
pub struct RemoteDeckService<T> {
    transport: T,
}

impl<T: Transport> RemoteDeckService<T> {
    /// Creates a service that issues requests through `transport`.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

fn check_deck_id(deck: &DeckId) -> Result<(), SourceError> {
    let valid = !deck.as_str().is_empty()
        && deck
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SourceError::Unavailable(format!("invalid deck id `{deck}`")))
    }
}

impl<T: Transport> CardSource for RemoteDeckService<T> {
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError> {
        if deck_count == 0 {
            return Err(SourceError::Unavailable(
                "deck count must be at least 1".into(),
            ));
        }

        let body = self.transport.get(&wire::new_deck_path(deck_count))?;
        let deck = wire::parse_new_deck(&body)?;
        log::debug!("remote service shuffled {deck_count} deck(s) as {deck}");
        Ok(deck)
    }

    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        check_deck_id(deck)?;
        let body = self.transport.get(&wire::draw_path(deck, count))?;
        wire::parse_draw(&body, count)
    }
}
