//! Error types for game operations.

use thiserror::Error;

/// Errors reported by a card source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source could not be reached or answered with a non-success response.
    #[error("card source unavailable: {0}")]
    Unavailable(String),
    /// Fewer cards remain in the deck than were requested.
    #[error("deck exhausted: requested {requested} card(s), {remaining} remaining")]
    DeckExhausted {
        /// Number of cards requested.
        requested: usize,
        /// Number of cards that were left.
        remaining: usize,
    },
}

/// Errors that can occur while persisting the score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The backing store could not be written.
    #[error("failed to write score record: {0}")]
    Io(String),
    /// The score could not be encoded.
    #[error("failed to encode score record: {0}")]
    Encode(String),
}

/// Errors that can occur while dealing a round.
///
/// A failed deal never leaves a partially dealt round behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    /// A round is still in progress.
    #[error("invalid game state for dealing")]
    InvalidState,
    /// Deck count outside the accepted range.
    #[error("invalid deck count {0} (expected 1..=8)")]
    InvalidDeckCount(u8),
    /// No game has been started.
    #[error("no game has been started")]
    NotConfigured,
    /// The table was restarted or left while the deal was in flight.
    #[error("deal superseded by a newer round")]
    Stale,
    /// The card source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors that can occur during player and dealer actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No round has been dealt.
    #[error("no round in progress")]
    NoRound,
    /// Invalid round state for this action.
    #[error("invalid game state for this action")]
    InvalidState,
    /// The round was replaced, or the dealer hand changed, while a draw was in
    /// flight; the card was discarded.
    #[error("round superseded while drawing")]
    Stale,
    /// The card source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}
