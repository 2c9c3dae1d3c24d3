//! Score ledger and persistence tests.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use bjtable::{
    GameOptions, JsonFileScoreStore, MemoryScoreStore, Outcome, Score, ScoreLedger, ScoreStore,
};

fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("bjtable-{}-{n}", std::process::id()))
        .join(name)
}

#[test]
fn record_increments_exactly_one_counter() {
    let mut ledger = ScoreLedger::load(MemoryScoreStore::new());
    assert_eq!(ledger.score(), Score::default());

    let outcomes = [
        Outcome::Win,
        Outcome::Lose,
        Outcome::Win,
        Outcome::Draw,
        Outcome::Lose,
        Outcome::Win,
    ];
    for (n, outcome) in outcomes.into_iter().enumerate() {
        let before = ledger.score();
        let after = ledger.record(outcome).unwrap();
        assert_eq!(after.total(), before.total() + 1);
        assert_eq!(after.total(), n as u64 + 1);
    }

    assert_eq!(
        ledger.score(),
        Score {
            wins: 3,
            losses: 2,
            draws: 1
        }
    );
    assert_eq!(ledger.store().saved(), Some(ledger.score()));
}

#[test]
fn missing_file_loads_zero() {
    let store = JsonFileScoreStore::new(temp_path("absent.json"));
    assert_eq!(store.load_score(), Score::default());
}

#[test]
fn file_store_persists_across_sessions() {
    let path = temp_path("score.json");

    let mut ledger = ScoreLedger::load(JsonFileScoreStore::new(&path));
    ledger.record(Outcome::Win).unwrap();
    ledger.record(Outcome::Draw).unwrap();

    let reloaded = ScoreLedger::load(JsonFileScoreStore::new(&path));
    assert_eq!(
        reloaded.score(),
        Score {
            wins: 1,
            losses: 0,
            draws: 1
        }
    );

    let raw = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["wins"], 1);
    assert_eq!(json["draws"], 1);

    let mut temp = path.clone().into_os_string();
    temp.push(".tmp");
    assert!(!PathBuf::from(temp).exists());
}

#[test]
fn corrupt_file_loads_zero() {
    let path = temp_path("corrupt.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"wins\": ").unwrap();

    let store = JsonFileScoreStore::new(&path);
    assert_eq!(store.load_score(), Score::default());
}

#[test]
fn legacy_record_fields_are_accepted() {
    let path = temp_path("legacy.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"player": 4, "dealer": 7, "draw": 2}"#).unwrap();

    let store = JsonFileScoreStore::new(&path);
    assert_eq!(
        store.load_score(),
        Score {
            wins: 4,
            losses: 7,
            draws: 2
        }
    );
}

#[test]
fn unwritable_path_surfaces_error_but_keeps_memory_score() {
    let dir = temp_path("blocked");
    fs::create_dir_all(&dir).unwrap();
    // The record path is an existing directory, so the rename fails.
    let mut ledger = ScoreLedger::load(JsonFileScoreStore::new(&dir));

    assert!(ledger.record(Outcome::Lose).is_err());
    assert_eq!(ledger.score().losses, 1);
}

#[test]
fn options_round_trip_through_json_form() {
    let options: GameOptions =
        serde_json::from_str(r#"{"decks": 4, "difficulty": "hard"}"#).unwrap();
    assert_eq!(
        options,
        GameOptions::default()
            .with_decks(4)
            .with_difficulty(bjtable::Difficulty::Hard)
    );

    let partial: GameOptions = serde_json::from_str(r#"{"difficulty": "easy"}"#).unwrap();
    assert_eq!(partial.decks, 1);
}
