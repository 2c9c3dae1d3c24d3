//! Round controller integration tests.

use std::collections::VecDeque;
use std::sync::{Barrier, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use bjtable::{
    ActionError, Card, CardSource, DealError, DealerStep, DeckId, Difficulty, Game, GameOptions,
    LocalDeckService, MemoryScoreStore, Outcome, PersistenceError, Rank, Score, ScoreStore,
    SourceError, Suit, Turn,
};

fn card(rank: Rank) -> Card {
    Card::new(rank, Suit::Spades)
}

/// Card source that hands out a fixed sequence of cards, whatever the deck.
struct ScriptedSource {
    cards: Mutex<VecDeque<Card>>,
    decks_issued: AtomicUsize,
    fail_new_decks: AtomicBool,
    released: Mutex<Vec<DeckId>>,
}

impl ScriptedSource {
    fn new(ranks: &[Rank]) -> Self {
        Self {
            cards: Mutex::new(ranks.iter().copied().map(card).collect()),
            decks_issued: AtomicUsize::new(0),
            fail_new_decks: AtomicBool::new(false),
            released: Mutex::new(Vec::new()),
        }
    }

    fn remaining(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    fn push(&self, ranks: &[Rank]) {
        self.cards
            .lock()
            .unwrap()
            .extend(ranks.iter().copied().map(card));
    }
}

impl CardSource for ScriptedSource {
    fn new_shuffled_deck(&self, _deck_count: u8) -> Result<DeckId, SourceError> {
        if self.fail_new_decks.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("503 Service Unavailable".into()));
        }
        let n = self.decks_issued.fetch_add(1, Ordering::SeqCst);
        Ok(DeckId::new(format!("scripted-{n}")))
    }

    fn draw(&self, _deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        let mut cards = self.cards.lock().unwrap();
        if cards.len() < count {
            return Err(SourceError::DeckExhausted {
                requested: count,
                remaining: cards.len(),
            });
        }
        Ok(cards.drain(..count).collect())
    }

    fn release(&self, deck: &DeckId) {
        self.released.lock().unwrap().push(deck.clone());
    }
}

/// Blocks the first single-card draw until released.
struct GatedSource {
    inner: ScriptedSource,
    entered: Mutex<Option<Sender<()>>>,
    release: Mutex<Option<Receiver<()>>>,
}

impl CardSource for GatedSource {
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError> {
        self.inner.new_shuffled_deck(deck_count)
    }

    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        if count == 1 {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
                let release = self.release.lock().unwrap().take().unwrap();
                release.recv().unwrap();
            }
        }
        self.inner.draw(deck, count)
    }
}

/// Holds single-card draws until two callers are inside `draw` at once.
struct RacingSource {
    inner: ScriptedSource,
    barrier: Barrier,
}

impl CardSource for RacingSource {
    fn new_shuffled_deck(&self, deck_count: u8) -> Result<DeckId, SourceError> {
        self.inner.new_shuffled_deck(deck_count)
    }

    fn draw(&self, deck: &DeckId, count: usize) -> Result<Vec<Card>, SourceError> {
        if count == 1 {
            self.barrier.wait();
        }
        self.inner.draw(deck, count)
    }
}

struct FailingStore;

impl ScoreStore for FailingStore {
    fn load_score(&self) -> Score {
        Score::default()
    }

    fn save_score(&self, _score: &Score) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io("disk full".into()))
    }
}

fn scripted_game(ranks: &[Rank]) -> Game<ScriptedSource, MemoryScoreStore> {
    Game::new(ScriptedSource::new(ranks), MemoryScoreStore::new())
}

/// Deals `ranks`, stands, and lets the dealer finish.
fn stand_and_play(ranks: &[Rank], difficulty: Difficulty) -> bjtable::RoundResult {
    let game = scripted_game(ranks);
    let dealt = game
        .start_game(GameOptions::default().with_difficulty(difficulty))
        .unwrap();
    assert!(dealt.is_none());
    game.stand().unwrap();
    game.dealer_play().unwrap()
}

#[test]
fn natural_blackjack_wins_without_any_turn() {
    let game = scripted_game(&[Rank::Ace, Rank::Nine, Rank::King, Rank::Seven]);

    let result = game.start_game(GameOptions::default()).unwrap().unwrap();
    assert_eq!(result.outcome, Outcome::Win);
    assert!(result.player_blackjack);
    assert_eq!(result.player_value, 21);
    assert_eq!(result.message(), "Blackjack! You win.");
    assert_eq!(result.score.wins, 1);

    assert_eq!(game.turn(), Some(Turn::Resolved(Outcome::Win)));
    assert_eq!(game.hit().unwrap_err(), ActionError::InvalidState);
    assert_eq!(game.stand().unwrap_err(), ActionError::InvalidState);
    assert!(game.dealer_steps().next().is_none());

    let round = game.round().unwrap();
    assert_eq!(round.dealer().len(), 2);
    assert!(round.dealer().is_hole_revealed());
    assert_eq!(game.source().remaining(), 0);
    assert_eq!(game.score(), Score { wins: 1, losses: 0, draws: 0 });
}

#[test]
fn natural_blackjack_wins_even_against_dealer_twenty_one() {
    let game = scripted_game(&[Rank::Ace, Rank::Ace, Rank::Queen, Rank::Jack]);

    let result = game.start_game(GameOptions::default()).unwrap().unwrap();
    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.dealer_value, 21);
}

#[test]
fn player_bust_loses_immediately() {
    let game = scripted_game(&[Rank::Ten, Rank::Nine, Rank::Eight, Rank::Six, Rank::Five]);
    assert!(game.start_game(GameOptions::default()).unwrap().is_none());
    assert_eq!(game.turn(), Some(Turn::PlayerTurn));

    let hit = game.hit().unwrap();
    assert_eq!(hit.card.rank, Rank::Five);

    let result = hit.result.unwrap();
    assert_eq!(result.outcome, Outcome::Lose);
    assert_eq!(result.player_value, 23);
    assert!(result.player_bust);
    assert!(!result.dealer_bust);
    assert_eq!(result.message(), "Bust! You lose.");

    let round = game.round().unwrap();
    assert_eq!(round.dealer().len(), 2);
    assert!(round.dealer().is_hole_revealed());
    assert_eq!(game.score().losses, 1);
    assert_eq!(game.dealer_play().unwrap_err(), ActionError::InvalidState);
}

#[test]
fn hit_below_twenty_one_keeps_player_turn() {
    let game = scripted_game(&[Rank::Two, Rank::Nine, Rank::Three, Rank::Seven, Rank::Four]);
    game.start_game(GameOptions::default()).unwrap();

    let hit = game.hit().unwrap();
    assert!(hit.result.is_none());
    assert_eq!(game.turn(), Some(Turn::PlayerTurn));
    assert_eq!(game.round().unwrap().player().value(), 9);
    assert_eq!(game.score().total(), 0);
}

#[test]
fn stand_on_twenty_against_dealer_final_values() {
    // Player 10 + K = 20; dealer 6 + 5 = 11 then draws once.
    let win = stand_and_play(
        &[Rank::Ten, Rank::Six, Rank::King, Rank::Five, Rank::Eight],
        Difficulty::Normal,
    );
    assert_eq!(win.dealer_value, 19);
    assert_eq!(win.outcome, Outcome::Win);
    assert_eq!(win.message(), "You win.");

    let draw = stand_and_play(
        &[Rank::Ten, Rank::Six, Rank::King, Rank::Five, Rank::Nine],
        Difficulty::Normal,
    );
    assert_eq!(draw.dealer_value, 20);
    assert_eq!(draw.outcome, Outcome::Draw);
    assert_eq!(draw.message(), "Push.");

    let lose = stand_and_play(
        &[Rank::Ten, Rank::Six, Rank::King, Rank::Five, Rank::Ten],
        Difficulty::Normal,
    );
    assert_eq!(lose.dealer_value, 21);
    assert_eq!(lose.outcome, Outcome::Lose);
    assert_eq!(lose.message(), "You lose.");
}

#[test]
fn dealer_bust_is_a_win() {
    let result = stand_and_play(
        &[Rank::Ten, Rank::Ten, Rank::Eight, Rank::Six, Rank::Queen],
        Difficulty::Normal,
    );
    assert_eq!(result.outcome, Outcome::Win);
    assert!(result.dealer_bust);
    assert_eq!(result.dealer_value, 26);
    assert_eq!(result.message(), "Dealer busts. You win.");
}

#[test]
fn hard_difficulty_hits_soft_seventeen() {
    // Player 10 + 9 = 19; dealer A + 6 = soft 17.
    let ranks = [Rank::Ten, Rank::Ace, Rank::Nine, Rank::Six, Rank::Two];

    let normal = stand_and_play(&ranks, Difficulty::Normal);
    assert_eq!(normal.dealer_value, 17);
    assert_eq!(normal.outcome, Outcome::Win);

    let hard = stand_and_play(&ranks, Difficulty::Hard);
    assert_eq!(hard.dealer_value, 19);
    assert_eq!(hard.outcome, Outcome::Draw);
}

#[test]
fn easy_difficulty_stands_on_sixteen() {
    let ranks = [Rank::Ten, Rank::Ten, Rank::Seven, Rank::Six, Rank::Five];

    let easy = stand_and_play(&ranks, Difficulty::Easy);
    assert_eq!(easy.dealer_value, 16);
    assert_eq!(easy.outcome, Outcome::Win);

    let normal = stand_and_play(&ranks, Difficulty::Normal);
    assert_eq!(normal.dealer_value, 21);
    assert_eq!(normal.outcome, Outcome::Lose);
}

#[test]
fn dealer_steps_yield_each_draw_then_resolution() {
    let game = scripted_game(&[
        Rank::Ten,
        Rank::Two,
        Rank::Nine,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Three,
    ]);
    game.start_game(GameOptions::default()).unwrap();
    assert!(game.dealer_steps().next().is_none());
    game.stand().unwrap();
    assert_eq!(game.turn(), Some(Turn::DealerTurn));

    let steps: Vec<DealerStep> = game.dealer_steps().map(Result::unwrap).collect();
    let values: Vec<u32> = steps
        .iter()
        .filter_map(|step| match step {
            DealerStep::Draw { value, .. } => Some(*value),
            DealerStep::Resolved(_) => None,
        })
        .collect();
    assert_eq!(values, vec![9, 14, 17]);

    let Some(DealerStep::Resolved(result)) = steps.last() else {
        panic!("last step should resolve the round");
    };
    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(game.score().wins, 1);
}

#[test]
fn dealer_steps_resume_after_being_dropped() {
    let game = scripted_game(&[
        Rank::Ten,
        Rank::Two,
        Rank::Eight,
        Rank::Three,
        Rank::Four,
        Rank::Nine,
    ]);
    game.start_game(GameOptions::default()).unwrap();
    game.stand().unwrap();

    let first = game.dealer_steps().next().unwrap().unwrap();
    assert!(matches!(first, DealerStep::Draw { value: 9, .. }));
    assert_eq!(game.turn(), Some(Turn::DealerTurn));

    let result = game.dealer_play().unwrap();
    assert_eq!(result.dealer_value, 18);
    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(game.score().total(), 1);
}

#[test]
fn dealer_draw_failure_leaves_round_resumable() {
    let game = scripted_game(&[Rank::Ten, Rank::Two, Rank::Nine, Rank::Three]);
    game.start_game(GameOptions::default()).unwrap();
    game.stand().unwrap();

    let err = game.dealer_play().unwrap_err();
    assert_eq!(
        err,
        ActionError::Source(SourceError::DeckExhausted {
            requested: 1,
            remaining: 0
        })
    );
    assert_eq!(game.turn(), Some(Turn::DealerTurn));
    assert_eq!(game.score().total(), 0);

    game.source().push(&[Rank::King, Rank::Two]);
    let result = game.dealer_play().unwrap();
    assert_eq!(result.dealer_value, 17);
    assert_eq!(result.outcome, Outcome::Win);
}

#[test]
fn hit_failure_does_not_touch_the_round() {
    let game = scripted_game(&[Rank::Two, Rank::Nine, Rank::Three, Rank::Seven]);
    game.start_game(GameOptions::default()).unwrap();

    assert!(matches!(
        game.hit().unwrap_err(),
        ActionError::Source(SourceError::DeckExhausted { .. })
    ));
    assert_eq!(game.turn(), Some(Turn::PlayerTurn));
    assert_eq!(game.round().unwrap().player().len(), 2);
}

#[test]
fn view_conceals_hole_card_until_stand() {
    let game = scripted_game(&[Rank::Ten, Rank::Nine, Rank::Eight, Rank::Ace, Rank::Two]);
    game.start_game(GameOptions::default()).unwrap();

    let view = game.view().unwrap();
    assert_eq!(view.player.len(), 2);
    assert!(view.player.iter().all(|c| !c.concealed));
    assert!(!view.dealer[0].concealed);
    assert!(view.dealer[1].concealed);
    assert_eq!(view.dealer[1].card.rank, Rank::Ace);
    assert_eq!(view.dealer_value, 9);
    assert_eq!(view.player_value, 18);
    assert_eq!(view.message, None);

    game.stand().unwrap();
    let view = game.view().unwrap();
    assert!(!view.dealer[1].concealed);
    assert_eq!(view.dealer_value, 20);

    game.dealer_play().unwrap();
    let view = game.view().unwrap();
    assert_eq!(view.turn, Turn::Resolved(Outcome::Lose));
    assert_eq!(view.message, Some("You lose."));
}

#[test]
fn new_round_requires_resolution_and_starts_clean() {
    let game = scripted_game(&[
        Rank::Ten,
        Rank::Nine,
        Rank::Eight,
        Rank::Seven,
        Rank::King,
        // second round
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
    ]);
    game.start_game(GameOptions::default()).unwrap();
    assert_eq!(game.new_round().unwrap_err(), DealError::InvalidState);
    assert_eq!(
        game.start_game(GameOptions::default()).unwrap_err(),
        DealError::InvalidState
    );

    let bust = game.hit().unwrap().result.unwrap();
    assert_eq!(bust.outcome, Outcome::Lose);
    let first = game.round().unwrap();

    assert!(game.new_round().unwrap().is_none());
    let second = game.round().unwrap();
    assert_ne!(first.deck_id(), second.deck_id());
    assert_eq!(second.turn(), Turn::PlayerTurn);
    assert_eq!(second.outcome(), None);
    assert_eq!(second.player().len(), 2);
    assert_eq!(second.player().value(), 6);
    assert_eq!(second.dealer().len(), 2);
    assert!(!second.dealer().is_hole_revealed());
    assert_eq!(game.view().unwrap().message, None);
    assert_eq!(game.source().decks_issued.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_start_changes_nothing() {
    let game = scripted_game(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five]);
    game.source().fail_new_decks.store(true, Ordering::SeqCst);

    let err = game.start_game(GameOptions::default()).unwrap_err();
    assert_eq!(
        err,
        DealError::Source(SourceError::Unavailable("503 Service Unavailable".into()))
    );
    assert!(game.is_in_menu());
    assert!(game.round().is_none());

    game.source().fail_new_decks.store(false, Ordering::SeqCst);
    game.start_game(GameOptions::default()).unwrap();
    assert_eq!(game.turn(), Some(Turn::PlayerTurn));
}

#[test]
fn exhausted_deck_at_deal_leaves_no_partial_round() {
    let game = scripted_game(&[Rank::Two, Rank::Three, Rank::Four]);

    assert_eq!(
        game.start_game(GameOptions::default()).unwrap_err(),
        DealError::Source(SourceError::DeckExhausted {
            requested: 4,
            remaining: 3
        })
    );
    assert!(game.round().is_none());
    assert_eq!(game.source().remaining(), 3);
}

#[test]
fn invalid_deck_count_is_rejected() {
    let game = scripted_game(&[]);
    assert_eq!(
        game.start_game(GameOptions::default().with_decks(0))
            .unwrap_err(),
        DealError::InvalidDeckCount(0)
    );
    assert_eq!(
        game.start_game(GameOptions::default().with_decks(9))
            .unwrap_err(),
        DealError::InvalidDeckCount(9)
    );
    assert_eq!(game.source().decks_issued.load(Ordering::SeqCst), 0);
}

#[test]
fn persistence_failure_keeps_in_memory_score() {
    let game = Game::new(
        ScriptedSource::new(&[Rank::Ace, Rank::Two, Rank::Queen, Rank::Three]),
        FailingStore,
    );

    let result = game.start_game(GameOptions::default()).unwrap().unwrap();
    assert_eq!(
        result.persistence_error,
        Some(PersistenceError::Io("disk full".into()))
    );
    assert_eq!(result.score.wins, 1);
    assert_eq!(game.score().wins, 1);
    assert_eq!(game.turn(), Some(Turn::Resolved(Outcome::Win)));
}

#[test]
fn every_resolved_round_is_recorded_once() {
    let store = MemoryScoreStore::new();
    let game = Game::new(LocalDeckService::new(2024), &store);
    game.start_game(GameOptions::default().with_decks(2))
        .unwrap();

    let rounds = 25;
    for round in 0..rounds {
        if round > 0 {
            game.new_round().unwrap();
        }
        while game.turn() == Some(Turn::PlayerTurn) {
            if game.round().unwrap().player().value() < 15 {
                game.hit().unwrap();
            } else {
                game.stand().unwrap();
            }
        }
        if game.turn() == Some(Turn::DealerTurn) {
            game.dealer_play().unwrap();
        }
        assert!(game.round().unwrap().is_resolved());
    }

    assert_eq!(game.score().total(), rounds);
    assert_eq!(store.saved(), Some(game.score()));
}

#[test]
fn score_is_loaded_at_session_start() {
    let store = MemoryScoreStore::with_score(Score {
        wins: 3,
        losses: 2,
        draws: 1,
    });
    let game = Game::new(
        ScriptedSource::new(&[Rank::King, Rank::Two, Rank::Ace, Rank::Three]),
        &store,
    );
    assert_eq!(game.score().total(), 6);

    game.start_game(GameOptions::default()).unwrap();
    assert_eq!(
        store.saved(),
        Some(Score {
            wins: 4,
            losses: 2,
            draws: 1
        })
    );
}

#[test]
fn return_to_menu_discards_round_but_keeps_score() {
    let game = scripted_game(&[Rank::Ace, Rank::Two, Rank::King, Rank::Three]);
    game.start_game(GameOptions::default().with_difficulty(Difficulty::Hard))
        .unwrap();
    assert_eq!(
        game.options(),
        Some(GameOptions::default().with_difficulty(Difficulty::Hard))
    );

    game.return_to_menu();
    assert!(game.is_in_menu());
    assert!(game.round().is_none());
    assert_eq!(game.hit().unwrap_err(), ActionError::NoRound);
    assert_eq!(game.stand().unwrap_err(), ActionError::NoRound);
    assert_eq!(game.dealer_play().unwrap_err(), ActionError::NoRound);
    assert_eq!(game.new_round().unwrap_err(), DealError::NotConfigured);
    assert_eq!(game.restart().unwrap_err(), DealError::NotConfigured);
    assert_eq!(game.score().wins, 1);
}

#[test]
fn restart_abandons_an_unresolved_round() {
    let game = scripted_game(&[
        Rank::Ten,
        Rank::Nine,
        Rank::Two,
        Rank::Seven,
        // restarted round
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
    ]);
    game.start_game(GameOptions::default()).unwrap();
    let first = game.round().unwrap();

    assert!(game.restart().unwrap().is_none());
    let second = game.round().unwrap();
    assert_ne!(first.deck_id(), second.deck_id());
    assert_eq!(second.player().value(), 10);
    assert_eq!(game.score().total(), 0);
}

#[test]
fn restart_discards_late_hit_response() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let source = GatedSource {
        inner: ScriptedSource::new(&[
            Rank::Ten,
            Rank::Nine,
            Rank::Two,
            Rank::Seven,
            // restarted round
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            // late hit card
            Rank::King,
        ]),
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
    };
    let game = Game::new(source, MemoryScoreStore::new());
    game.start_game(GameOptions::default()).unwrap();

    std::thread::scope(|scope| {
        let pending = scope.spawn(|| game.hit());

        entered_rx.recv().unwrap();
        game.restart().unwrap();
        release_tx.send(()).unwrap();

        assert_eq!(pending.join().unwrap().unwrap_err(), ActionError::Stale);
    });

    let round = game.round().unwrap();
    assert_eq!(round.turn(), Turn::PlayerTurn);
    assert_eq!(round.player().len(), 2);
    assert_eq!(round.player().value(), 10);
    assert_eq!(game.score().total(), 0);
}

#[test]
fn concurrent_dealer_steps_draw_once_per_decision() {
    let source = RacingSource {
        inner: ScriptedSource::new(&[
            Rank::Ten,
            Rank::Six,
            Rank::King,
            Rank::Ten,
            // two draws race for the dealer's 16
            Rank::Two,
            Rank::Three,
        ]),
        barrier: Barrier::new(2),
    };
    let game = Game::new(source, MemoryScoreStore::new());
    game.start_game(GameOptions::default()).unwrap();
    game.stand().unwrap();

    let (a, b) = std::thread::scope(|scope| {
        let a = scope.spawn(|| game.dealer_steps().next());
        let b = scope.spawn(|| game.dealer_steps().next());
        (a.join().unwrap(), b.join().unwrap())
    });
    let steps = [a, b];
    let drew = steps
        .iter()
        .filter(|step| matches!(step, Some(Ok(DealerStep::Draw { .. }))))
        .count();
    let stale = steps
        .iter()
        .filter(|step| matches!(step, Some(Err(ActionError::Stale))))
        .count();
    assert_eq!((drew, stale), (1, 1));

    let round = game.round().unwrap();
    assert_eq!(round.dealer().len(), 3);
    assert!(matches!(round.dealer().value(), 18 | 19));
    assert_eq!(round.turn(), Turn::DealerTurn);

    let result = game.dealer_play().unwrap();
    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(game.round().unwrap().dealer().len(), 3);
}

#[test]
fn replaced_rounds_release_their_decks() {
    let game = Game::new(LocalDeckService::new(77), MemoryScoreStore::new());
    game.start_game(GameOptions::default().with_decks(8)).unwrap();
    assert_eq!(game.source().deck_count(), 1);

    for _ in 0..200 {
        game.restart().unwrap();
    }
    assert_eq!(game.source().deck_count(), 1);

    if game.turn() == Some(Turn::PlayerTurn) {
        game.stand().unwrap();
    }
    if game.turn() == Some(Turn::DealerTurn) {
        game.dealer_play().unwrap();
    }
    game.new_round().unwrap();
    assert_eq!(game.source().deck_count(), 1);

    game.return_to_menu();
    assert_eq!(game.source().deck_count(), 0);
}

#[test]
fn failed_deal_releases_its_deck() {
    let game = scripted_game(&[Rank::Ten, Rank::Nine]);

    assert!(game.start_game(GameOptions::default()).is_err());
    assert_eq!(
        *game.source().released.lock().unwrap(),
        vec![DeckId::new("scripted-0")]
    );
    assert!(game.round().is_none());
}
