use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::card::{Card, standard_deck};
use crate::error::SourceError;
use crate::sync::Mutex;

use super::{CardSource, DeckId};

/// In-process card source backed by seeded shuffles.
///
/// Every deck is an independent shoe; the same seed always yields the same
/// sequence of decks.
pub struct LocalDeckService {
    /// Live shoes (`deck_id` -> remaining cards, top of the shoe last).
    decks: Mutex<HashMap<DeckId, Vec<Card>>>,
    /// Next deck number to assign.
    next_id: AtomicU64,
    /// Random number generator.
    rng: Mutex<ChaCha8Rng>,
}

impl LocalDeckService {
    /// Creates a service with the given shuffle seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            decks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Creates and shuffles a shoe with the specified number of decks.
    fn create_shoe(num_decks: u8, rng: &mut ChaCha8Rng) -> Vec<Card> {
        let mut cards = standard_deck(num_decks);
        cards.shuffle(rng);
        cards
    }

    /// Returns the number of cards left in `deck`, or `None` for an unknown id.
    pub fn remaining(&self, deck: &DeckId) -> Option<usize> {
        self.decks.lock().get(deck).map(Vec::len)
    }

    /// Drops `deck`. Returns whether it existed.
    pub fn discard(&self, deck: &DeckId) -> bool {
        self.decks.lock().remove(deck).is_some()
    }

    /// Number of decks currently held.
    pub fn deck_count(&self) -> usize {
        self.decks.lock().len()
    }
}

impl CardSource for LocalDeckService {
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError> {
        if deck_count == 0 {
            return Err(SourceError::Unavailable(
                "deck count must be at least 1".into(),
            ));
        }

        let shoe = Self::create_shoe(deck_count, &mut self.rng.lock());
        let id = DeckId::new(format!(
            "local-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        log::debug!("shuffled {deck_count} deck(s) as {id}");
        self.decks.lock().insert(id.clone(), shoe);

        Ok(id)
    }

    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        let mut decks = self.decks.lock();
        let shoe = decks
            .get_mut(deck)
            .ok_or_else(|| SourceError::Unavailable(format!("unknown deck {deck}")))?;

        if shoe.len() < count {
            return Err(SourceError::DeckExhausted {
                requested: count,
                remaining: shoe.len(),
            });
        }

        let mut drawn = shoe.split_off(shoe.len() - count);
        drawn.reverse();
        Ok(drawn)
    }

    fn release(&self, deck: &DeckId) {
        if self.discard(deck) {
            log::debug!("released {deck}");
        }
    }
}
