//! Display-ready snapshots of a round.

use serde::Serialize;

use crate::card::Card;

use super::state::{RoundState, Turn};

/// A card with its concealment resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    /// The real card. Renderers must not show it while `concealed` is set.
    pub card: Card,
    /// Whether the card is face down.
    pub concealed: bool,
}

/// What the table shows at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    /// Player cards, all face up.
    pub player: Vec<CardView>,
    /// Dealer cards; the hole card is concealed until revealed.
    pub dealer: Vec<CardView>,
    /// Player hand value.
    pub player_value: u32,
    /// Value of the dealer's visible cards.
    pub dealer_value: u32,
    /// Current turn.
    pub turn: Turn,
    /// Result message once resolved.
    pub message: Option<&'static str>,
}

impl RoundState {
    /// Builds the display snapshot of this round.
    #[must_use]
    pub fn view(&self) -> RoundView {
        let player = self
            .player
            .cards()
            .iter()
            .map(|card| CardView {
                card: card.clone(),
                concealed: false,
            })
            .collect();
        let dealer = self
            .dealer
            .cards()
            .iter()
            .enumerate()
            .map(|(index, card)| CardView {
                card: card.clone(),
                concealed: self.dealer.is_concealed(index),
            })
            .collect();

        RoundView {
            player,
            dealer,
            player_value: self.player.value(),
            dealer_value: self.dealer.visible_value(),
            turn: self.turn,
            message: self.message(),
        }
    }
}
