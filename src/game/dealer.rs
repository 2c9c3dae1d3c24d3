use crate::card::Card;
use crate::error::ActionError;
use crate::policy::must_draw;
use crate::result::{RoundResult, settle};
use crate::score::ScoreStore;
use crate::source::CardSource;

use super::{Game, Turn};

/// One step of the dealer's turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealerStep {
    /// The dealer drew `card`, bringing the hand to `value`.
    Draw {
        /// The card drawn.
        card: Card,
        /// Dealer hand value after the draw.
        value: u32,
    },
    /// The dealer stopped and the round was resolved.
    Resolved(RoundResult),
}

/// Lazy sequence of dealer steps, see [`Game::dealer_steps`].
pub struct DealerSteps<'a, S, P> {
    game: &'a Game<S, P>,
    finished: bool,
}

impl<S: CardSource, P: ScoreStore> Iterator for DealerSteps<'_, S, P> {
    type Item = Result<DealerStep, ActionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let step = self.game.dealer_step().transpose();
        self.finished = !matches!(step, Some(Ok(DealerStep::Draw { .. })));
        step
    }
}

impl<S: CardSource, P: ScoreStore> Game<S, P> {
    /// Plays the dealer's turn one draw at a time.
    ///
    /// Each item is one draw, and the last is [`DealerStep::Resolved`]. The
    /// iterator is empty outside the dealer's turn. Progress lives in the
    /// game, so after an error or a dropped iterator a new call resumes from
    /// the current hand. Pacing between steps is up to the caller.
    pub const fn dealer_steps(&self) -> DealerSteps<'_, S, P> {
        DealerSteps {
            game: self,
            finished: false,
        }
    }

    /// Dealer plays their hand to completion and the round is resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if no round is in progress, it is not the dealer's
    /// turn, or a draw fails.
    pub fn dealer_play(&self) -> Result<RoundResult, ActionError> {
        match self.turn() {
            None => return Err(ActionError::NoRound),
            Some(Turn::DealerTurn) => {}
            Some(_) => return Err(ActionError::InvalidState),
        }

        for step in self.dealer_steps() {
            if let DealerStep::Resolved(result) = step? {
                return Ok(result);
            }
        }

        Err(ActionError::InvalidState)
    }

    /// Performs the next dealer step, or `None` outside the dealer's turn.
    fn dealer_step(&self) -> Result<Option<DealerStep>, ActionError> {
        let mut guard = self.round.lock();
        let Some(round) = guard.as_mut() else {
            return Ok(None);
        };
        if round.turn != Turn::DealerTurn {
            return Ok(None);
        }

        if !must_draw(round.dealer.cards(), round.difficulty) {
            let outcome = settle(round.player.value(), round.dealer.value());
            return Ok(Some(DealerStep::Resolved(self.resolve(round, outcome))));
        }

        let (ticket, deck_id) = (round.ticket, round.deck_id.clone());
        let seen = round.dealer.len();
        drop(guard);

        let card = self.draw_one(ticket, &deck_id)?;

        let mut guard = self.round.lock();
        let round = self.live_round(&mut guard, ticket)?;
        if round.turn != Turn::DealerTurn {
            return Err(ActionError::InvalidState);
        }
        // Another step drew first; the policy has to be evaluated again.
        if round.dealer.len() != seen {
            log::debug!("discarding dealer draw {card}: hand changed while drawing");
            return Err(ActionError::Stale);
        }

        round.dealer.add_card(card.clone());
        let value = round.dealer.value();

        Ok(Some(DealerStep::Draw { card, value }))
    }
}
