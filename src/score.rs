//! Cumulative win/loss/draw tallies and their persistence.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::result::Outcome;
use crate::sync::Mutex;

/// Cumulative round outcomes.
///
/// Legacy records written as `{ "player", "dealer", "draw" }` load through
/// the field aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    /// Rounds won by the player.
    #[serde(alias = "player")]
    pub wins: u64,
    /// Rounds won by the dealer.
    #[serde(alias = "dealer")]
    pub losses: u64,
    /// Rounds tied.
    #[serde(alias = "draw")]
    pub draws: u64,
}

impl Score {
    /// Increments the counter matching `outcome`.
    pub const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins = self.wins.saturating_add(1),
            Outcome::Lose => self.losses = self.losses.saturating_add(1),
            Outcome::Draw => self.draws = self.draws.saturating_add(1),
        }
    }

    /// Total number of recorded rounds.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.wins + self.losses + self.draws
    }
}

/// Durable storage for a single [`Score`] record.
pub trait ScoreStore {
    /// Loads the stored score. Missing or unreadable data yields a zeroed score.
    fn load_score(&self) -> Score;

    /// Replaces the stored score with `score`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written.
    fn save_score(&self, score: &Score) -> Result<(), PersistenceError>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for &T {
    fn load_score(&self) -> Score {
        (**self).load_score()
    }

    fn save_score(&self, score: &Score) -> Result<(), PersistenceError> {
        (**self).save_score(score)
    }
}

/// In-memory score storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    score: Mutex<Option<Score>>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `score`.
    #[must_use]
    pub fn with_score(score: Score) -> Self {
        Self {
            score: Mutex::new(Some(score)),
        }
    }

    /// Returns the last saved score, if any.
    pub fn saved(&self) -> Option<Score> {
        *self.score.lock()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_score(&self) -> Score {
        self.saved().unwrap_or_default()
    }

    fn save_score(&self, score: &Score) -> Result<(), PersistenceError> {
        *self.score.lock() = Some(*score);
        Ok(())
    }
}

/// Score storage backed by a small JSON file.
///
/// Saves replace the whole record: the JSON is written to a sibling
/// `.tmp` file and renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    /// Creates a store for the record at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the score record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load_score(&self) -> Score {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Score::default(),
            Err(err) => {
                log::warn!("could not read score record {}: {err}", self.path.display());
                return Score::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!(
                "score record {} is corrupt, starting from zero: {err}",
                self.path.display()
            );
            Score::default()
        })
    }

    fn save_score(&self, score: &Score) -> Result<(), PersistenceError> {
        let json =
            serde_json::to_vec(score).map_err(|err| PersistenceError::Encode(err.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| PersistenceError::Io(err.to_string()))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|err| PersistenceError::Io(err.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|err| {
            let _ = fs::remove_file(&temp);
            PersistenceError::Io(err.to_string())
        })
    }
}

/// Owns the session's [`Score`] and writes it through a [`ScoreStore`].
#[derive(Debug)]
pub struct ScoreLedger<P> {
    store: P,
    score: Score,
}

impl<P: ScoreStore> ScoreLedger<P> {
    /// Loads the persisted score from `store`.
    pub fn load(store: P) -> Self {
        let score = store.load_score();
        Self { store, score }
    }

    /// Current in-memory score.
    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    /// Returns the backing store.
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Records one resolved round and persists the new score.
    ///
    /// The in-memory score is incremented before the write, so it reflects
    /// the round even when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the new score could not be written.
    pub fn record(&mut self, outcome: Outcome) -> Result<Score, PersistenceError> {
        self.score.record(outcome);
        self.store.save_score(&self.score)?;
        Ok(self.score)
    }
}
