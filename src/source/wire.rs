//! JSON payloads of the deck-of-cards HTTP protocol.
//!
//! `GET new/shuffle/?deck_count=N` answers with a [`NewDeckResponse`] and
//! `GET {deck_id}/draw/?count=N` with a [`DrawResponse`]. When a draw asks for
//! more cards than remain, the service reports `success: false` and returns
//! whatever it could draw.

use serde::Deserialize;

use crate::card::{Card, Rank, Suit};
use crate::error::SourceError;

use super::DeckId;

/// Response to a new-deck request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDeckResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Identifier of the new deck.
    #[serde(default)]
    pub deck_id: Option<String>,
    /// Whether the deck was shuffled.
    #[serde(default)]
    pub shuffled: bool,
    /// Cards left in the deck.
    #[serde(default)]
    pub remaining: usize,
    /// Failure description.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response to a draw request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DrawResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Identifier of the deck drawn from.
    #[serde(default)]
    pub deck_id: Option<String>,
    /// Cards drawn, in order.
    #[serde(default)]
    pub cards: Vec<ApiCard>,
    /// Cards left in the deck after the draw.
    #[serde(default)]
    pub remaining: usize,
    /// Failure description.
    #[serde(default)]
    pub error: Option<String>,
}

/// A card as the service encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiCard {
    /// Two-character code such as `"KH"` or `"0S"`.
    pub code: String,
    /// URL of the card face.
    #[serde(default)]
    pub image: Option<String>,
    /// `"ACE"`, `"2"`..`"10"`, `"JACK"`, `"QUEEN"` or `"KING"`.
    pub value: String,
    /// `"SPADES"`, `"HEARTS"`, `"DIAMONDS"` or `"CLUBS"`.
    pub suit: String,
}

impl ApiCard {
    /// Converts the payload into an engine card.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] for an unknown value or suit.
    pub fn into_card(self) -> Result<Card, SourceError> {
        let rank = parse_rank(&self.value)?;
        let suit = parse_suit(&self.suit)?;

        let card = Card::new(rank, suit).with_code(self.code);
        Ok(match self.image {
            Some(image) => card.with_image(image),
            None => card,
        })
    }
}

fn parse_rank(value: &str) -> Result<Rank, SourceError> {
    let rank = match value {
        "ACE" => Rank::Ace,
        "2" => Rank::Two,
        "3" => Rank::Three,
        "4" => Rank::Four,
        "5" => Rank::Five,
        "6" => Rank::Six,
        "7" => Rank::Seven,
        "8" => Rank::Eight,
        "9" => Rank::Nine,
        "10" => Rank::Ten,
        "JACK" => Rank::Jack,
        "QUEEN" => Rank::Queen,
        "KING" => Rank::King,
        other => {
            return Err(SourceError::Unavailable(format!(
                "unknown card value `{other}`"
            )));
        }
    };
    Ok(rank)
}

fn parse_suit(suit: &str) -> Result<Suit, SourceError> {
    match suit {
        "SPADES" => Ok(Suit::Spades),
        "HEARTS" => Ok(Suit::Hearts),
        "DIAMONDS" => Ok(Suit::Diamonds),
        "CLUBS" => Ok(Suit::Clubs),
        other => Err(SourceError::Unavailable(format!(
            "unknown card suit `{other}`"
        ))),
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, SourceError> {
    serde_json::from_str(body)
        .map_err(|err| SourceError::Unavailable(format!("malformed response: {err}")))
}

/// Path of a new-deck request, relative to the service base URL.
#[must_use]
pub fn new_deck_path(deck_count: u8) -> String {
    format!("new/shuffle/?deck_count={deck_count}")
}

/// Path of a draw request, relative to the service base URL.
#[must_use]
pub fn draw_path(deck: &DeckId, count: usize) -> String {
    format!("{deck}/draw/?count={count}")
}

/// Parses a new-deck response body.
///
/// # Errors
///
/// Returns [`SourceError::Unavailable`] for a malformed or non-success body.
pub fn parse_new_deck(body: &str) -> Result<DeckId, SourceError> {
    let response: NewDeckResponse = decode(body)?;

    match (response.success, response.deck_id) {
        (true, Some(id)) if !id.is_empty() => Ok(DeckId::new(id)),
        _ => Err(SourceError::Unavailable(
            response
                .error
                .unwrap_or_else(|| "deck was not created".into()),
        )),
    }
}

/// Parses a draw response body for a request of `requested` cards.
///
/// # Errors
///
/// Returns [`SourceError::DeckExhausted`] when the service ran out of cards,
/// [`SourceError::Unavailable`] for any other failure.
pub fn parse_draw(body: &str, requested: usize) -> Result<Vec<Card>, SourceError> {
    let response: DrawResponse = decode(body)?;

    if !response.success {
        let exhausted = response
            .error
            .as_deref()
            .is_none_or(|err| err.contains("remaining"));
        if exhausted && response.cards.len() < requested {
            return Err(SourceError::DeckExhausted {
                requested,
                remaining: response.cards.len(),
            });
        }
        return Err(SourceError::Unavailable(
            response.error.unwrap_or_else(|| "draw failed".into()),
        ));
    }

    if response.cards.len() != requested {
        return Err(SourceError::Unavailable(format!(
            "expected {requested} card(s), received {}",
            response.cards.len()
        )));
    }

    response.cards.into_iter().map(ApiCard::into_card).collect()
}
