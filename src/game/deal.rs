use crate::card::Card;
use crate::error::{DealError, SourceError};
use crate::options::GameOptions;
use crate::result::{Outcome, RoundResult};
use crate::score::ScoreStore;
use crate::source::{CardSource, DeckId};

use super::{Game, RoundState};

impl<S: CardSource, P: ScoreStore> Game<S, P> {
    /// Starts a game with `options` and deals the first round.
    ///
    /// Returns `Some` when the deal ended the round at once (natural
    /// blackjack). On error nothing changes and the call may be retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, a round is still in
    /// progress, or the card source fails.
    pub fn start_game(&self, options: GameOptions) -> Result<Option<RoundResult>, DealError> {
        options.validate()?;
        self.ensure_between_rounds()?;

        let result = self.deal(options)?;
        *self.options.lock() = Some(options);
        log::info!(
            "game started with {} deck(s) on {} difficulty",
            options.decks,
            options.difficulty
        );

        Ok(result)
    }

    /// Discards the resolved round and deals a new one from a fresh deck.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is running, the current round has not been
    /// resolved, or the card source fails.
    pub fn new_round(&self) -> Result<Option<RoundResult>, DealError> {
        let options = self.options().ok_or(DealError::NotConfigured)?;
        self.ensure_between_rounds()?;
        self.deal(options)
    }

    /// Abandons the current round whatever its state and deals a new one.
    ///
    /// Draws still in flight for the abandoned round are discarded when they
    /// return. If the new deal fails the table is left without a round.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is running or the card source fails.
    pub fn restart(&self) -> Result<Option<RoundResult>, DealError> {
        let options = self.options().ok_or(DealError::NotConfigured)?;

        self.generation.advance();
        let abandoned = self.round.lock().take();
        if let Some(round) = abandoned {
            log::info!("round abandoned");
            self.source.release(&round.deck_id);
        }

        self.deal(options)
    }

    /// Leaves the table: the round and options are discarded, the score stays.
    pub fn return_to_menu(&self) {
        self.generation.advance();
        let previous = self.round.lock().take();
        *self.options.lock() = None;
        if let Some(round) = previous {
            self.source.release(&round.deck_id);
        }
    }

    fn ensure_between_rounds(&self) -> Result<(), DealError> {
        match self.round.lock().as_ref() {
            Some(round) if !round.is_resolved() => Err(DealError::InvalidState),
            _ => Ok(()),
        }
    }

    /// Requests a fresh deck, deals four cards and installs the round.
    fn deal(&self, options: GameOptions) -> Result<Option<RoundResult>, DealError> {
        let ticket = self.generation.advance();

        let deck_id = self.source.new_shuffled_deck(options.decks)?;
        let cards = match self.draw_opening(&deck_id) {
            Ok(cards) => cards,
            Err(err) => {
                self.source.release(&deck_id);
                return Err(err.into());
            }
        };

        let mut round = RoundState::deal(ticket, deck_id, options.difficulty, cards);
        log::debug!(
            "dealt round {ticket} from {}: player {}, dealer shows {}",
            round.deck_id,
            round.player.value(),
            round.dealer.visible_value()
        );

        let mut guard = self.round.lock();
        if !self.generation.is_current(ticket) {
            drop(guard);
            log::debug!("discarding deal for superseded round {ticket}");
            self.source.release(&round.deck_id);
            return Err(DealError::Stale);
        }

        let result = round
            .player
            .is_blackjack()
            .then(|| self.resolve(&mut round, Outcome::Win));
        let previous = guard.replace(round);
        drop(guard);

        if let Some(previous) = previous {
            self.source.release(&previous.deck_id);
        }

        Ok(result)
    }

    fn draw_opening(&self, deck_id: &DeckId) -> Result<[Card; 4], SourceError> {
        self.source
            .draw(deck_id, 4)?
            .try_into()
            .map_err(|cards: Vec<Card>| {
                SourceError::Unavailable(format!("expected 4 cards, received {}", cards.len()))
            })
    }
}
