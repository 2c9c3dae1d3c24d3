//! A single-player blackjack table against a computer dealer.
//!
//! The crate provides a [`Game`] type that runs the round state machine:
//! the deal, the player's hits and stand, the dealer's turn under a
//! [`Difficulty`] policy, and resolution into a persisted win/loss/draw
//! [`Score`]. Cards come from a [`CardSource`] and the score is kept in a
//! [`ScoreStore`], both injected.
//!
//! # Example
//!
//! ```
//! use bjtable::{Game, GameOptions, LocalDeckService, MemoryScoreStore, Turn};
//!
//! let game = Game::new(LocalDeckService::new(7), MemoryScoreStore::new());
//! game.start_game(GameOptions::default()).unwrap();
//!
//! if game.turn() == Some(Turn::PlayerTurn) {
//!     game.stand().unwrap();
//!     let result = game.dealer_play().unwrap();
//!     println!("{}", result.message());
//! }
//! assert_eq!(game.score().total(), 1);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod card;
pub mod error;
pub mod game;
pub mod hand;
pub mod options;
pub mod policy;
pub mod result;
pub mod score;
pub mod source;
mod sync;

// Re-export main types
pub use card::{Card, DECK_SIZE, Rank, Suit};
pub use error::{ActionError, DealError, PersistenceError, SourceError};
pub use game::{CardView, DealerStep, DealerSteps, Game, Hit, RoundState, RoundView, Turn};
pub use hand::{DealerHand, Hand, HandValue};
pub use options::GameOptions;
pub use policy::{Difficulty, must_draw};
pub use result::{Outcome, RoundResult};
pub use score::{JsonFileScoreStore, MemoryScoreStore, Score, ScoreLedger, ScoreStore};
pub use source::{CardSource, DeckId, LocalDeckService, RemoteDeckService, Transport};
