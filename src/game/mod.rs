//! Round controller: deal, player turn, dealer turn and resolution.

use crate::card::Card;
use crate::error::{ActionError, SourceError};
use crate::options::GameOptions;
use crate::result::{Outcome, RoundResult};
use crate::score::{Score, ScoreLedger, ScoreStore};
use crate::source::{CardSource, DeckId};
use crate::sync::{Generation, Mutex};

mod actions;
mod deal;
mod dealer;
pub mod state;
pub mod view;

pub use actions::Hit;
pub use dealer::{DealerStep, DealerSteps};
pub use state::{RoundState, Turn};
pub use view::{CardView, RoundView};

/// A single-player blackjack table against a computer dealer.
///
/// The game owns the card source, the current round and the score ledger.
/// Every action takes `&self`; the round lock is released while the card
/// source is called, and a round ticket guards against late responses
/// landing on a round that was restarted in the meantime.
pub struct Game<S, P> {
    /// Where decks come from.
    source: S,
    /// Options of the running game; `None` while at the menu.
    options: Mutex<Option<GameOptions>>,
    /// Current round; `None` until the first deal succeeds.
    round: Mutex<Option<RoundState>>,
    /// Cumulative score and its store.
    ledger: Mutex<ScoreLedger<P>>,
    /// Round ticket counter.
    generation: Generation,
}

impl<S: CardSource, P: ScoreStore> Game<S, P> {
    /// Creates a table at the menu, loading the persisted score from `store`.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::{Game, LocalDeckService, MemoryScoreStore};
    ///
    /// let game = Game::new(LocalDeckService::new(42), MemoryScoreStore::new());
    /// assert!(game.is_in_menu());
    /// assert_eq!(game.score().total(), 0);
    /// ```
    pub fn new(source: S, store: P) -> Self {
        let ledger = ScoreLedger::load(store);
        let score = ledger.score();
        log::info!(
            "session started: {} win(s), {} loss(es), {} draw(s)",
            score.wins,
            score.losses,
            score.draws
        );

        Self {
            source,
            options: Mutex::new(None),
            round: Mutex::new(None),
            ledger: Mutex::new(ledger),
            generation: Generation::new(),
        }
    }

    /// Returns the card source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the current score.
    pub fn score(&self) -> Score {
        self.ledger.lock().score()
    }

    /// Returns the options of the running game.
    pub fn options(&self) -> Option<GameOptions> {
        *self.options.lock()
    }

    /// Returns whether no game is running.
    pub fn is_in_menu(&self) -> bool {
        self.options.lock().is_none()
    }

    /// Returns a clone of the current round.
    pub fn round(&self) -> Option<RoundState> {
        self.round.lock().clone()
    }

    /// Returns the current turn.
    pub fn turn(&self) -> Option<Turn> {
        self.round.lock().as_ref().map(RoundState::turn)
    }

    /// Returns the display snapshot of the current round.
    pub fn view(&self) -> Option<RoundView> {
        self.round.lock().as_ref().map(RoundState::view)
    }

    /// Captures what an in-flight draw needs, provided the round is in `expected`.
    fn pending_draw(&self, expected: Turn) -> Result<(u64, DeckId), ActionError> {
        let guard = self.round.lock();
        let round = guard.as_ref().ok_or(ActionError::NoRound)?;
        if round.turn != expected {
            return Err(ActionError::InvalidState);
        }
        Ok((round.ticket, round.deck_id.clone()))
    }

    /// Draws one card for the round holding `ticket`. A failure after that
    /// round was replaced is reported as [`ActionError::Stale`], since its deck
    /// may already be released.
    fn draw_one(&self, ticket: u64, deck: &DeckId) -> Result<Card, ActionError> {
        let drawn = self.source.draw(deck, 1).map_err(|err| {
            if self.generation.is_current(ticket) {
                ActionError::from(err)
            } else {
                ActionError::Stale
            }
        })?;
        let card = drawn
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Unavailable("source returned no card".into()))?;
        log::debug!("drew {card} from {deck}");
        Ok(card)
    }

    /// Re-finds the round a draw was started for after the lock was released.
    fn live_round<'a>(
        &self,
        round: &'a mut Option<RoundState>,
        ticket: u64,
    ) -> Result<&'a mut RoundState, ActionError> {
        if !self.generation.is_current(ticket) {
            log::debug!("discarding draw for superseded round {ticket}");
            return Err(ActionError::Stale);
        }
        round
            .as_mut()
            .filter(|round| round.ticket == ticket)
            .ok_or(ActionError::Stale)
    }

    /// Ends `round` with `outcome` and records it. Runs exactly once per round,
    /// on the transition into [`Turn::Resolved`].
    fn resolve(&self, round: &mut RoundState, outcome: Outcome) -> RoundResult {
        round.dealer.reveal_hole();
        round.turn = Turn::Resolved(outcome);

        let mut ledger = self.ledger.lock();
        let persistence_error = ledger.record(outcome).err();
        let score = ledger.score();
        drop(ledger);

        if let Some(err) = &persistence_error {
            log::warn!("round recorded in memory only: {err}");
        }
        log::info!(
            "round resolved: {outcome} (player {}, dealer {})",
            round.player.value(),
            round.dealer.value()
        );

        round.summary(outcome, score, persistence_error)
    }
}
