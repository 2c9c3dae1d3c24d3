use crate::card::Card;
use crate::error::ActionError;
use crate::result::{Outcome, RoundResult};
use crate::score::ScoreStore;
use crate::source::CardSource;

use super::{Game, Turn};

/// Result of a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// The card drawn.
    pub card: Card,
    /// Set when the card busted the player and ended the round.
    pub result: Option<RoundResult>,
}

impl<S: CardSource, P: ScoreStore> Game<S, P> {
    /// Player action: Hit (draw a card).
    ///
    /// A bust ends the round as a loss straight away; the dealer draws
    /// nothing more and the hole card is only revealed for display.
    ///
    /// # Errors
    ///
    /// Returns an error if no round is in progress, it is not the player's
    /// turn, the round was replaced while drawing, or the card source fails.
    pub fn hit(&self) -> Result<Hit, ActionError> {
        let (ticket, deck_id) = self.pending_draw(Turn::PlayerTurn)?;
        let card = self.draw_one(ticket, &deck_id)?;

        let mut guard = self.round.lock();
        let round = self.live_round(&mut guard, ticket)?;
        if round.turn != Turn::PlayerTurn {
            return Err(ActionError::InvalidState);
        }

        round.player.add_card(card.clone());
        let result = round
            .player
            .is_bust()
            .then(|| self.resolve(round, Outcome::Lose));

        Ok(Hit { card, result })
    }

    /// Player action: Stand (keep current hand).
    ///
    /// Hands the round to the dealer and reveals the hole card. Drive the
    /// dealer with [`Game::dealer_steps`] or [`Game::dealer_play`].
    ///
    /// # Errors
    ///
    /// Returns an error if no round is in progress or it is not the player's
    /// turn.
    pub fn stand(&self) -> Result<(), ActionError> {
        let mut guard = self.round.lock();
        let round = guard.as_mut().ok_or(ActionError::NoRound)?;
        if round.turn != Turn::PlayerTurn {
            return Err(ActionError::InvalidState);
        }

        round.turn = Turn::DealerTurn;
        round.dealer.reveal_hole();
        log::debug!("player stands on {}", round.player.value());

        Ok(())
    }
}
