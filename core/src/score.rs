use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use serde::{Deserialize, Serialize};
use time::Date;

/// A finished game as handed to a [`Leaderboard`]. `score` is the elapsed time in seconds,
/// so lower is better.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    pub date: Date,
    pub difficulty: String,
}

impl ScoreRecord {
    pub fn new(
        name: impl Into<String>,
        score: u32,
        date: Date,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            score,
            date,
            difficulty: difficulty.into(),
        }
    }
}

/// Where finished games are kept. Storage and transport are up to the implementor.
pub trait Leaderboard {
    type Error;

    fn submit(&mut self, record: ScoreRecord) -> Result<(), Self::Error>;

    /// All records, fastest first.
    fn scores(&self) -> Result<Vec<ScoreRecord>, Self::Error>;
}

/// Leaderboard kept in memory, always sorted by score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLeaderboard {
    records: Vec<ScoreRecord>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn for_difficulty<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ScoreRecord> {
        self.records
            .iter()
            .filter(move |record| record.difficulty == label)
    }

    /// Drops every record equal to `record`; returns whether any were found.
    pub fn remove(&mut self, record: &ScoreRecord) -> bool {
        let before = self.records.len();
        self.records.retain(|kept| kept != record);
        self.records.len() != before
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Leaderboard for MemoryLeaderboard {
    type Error = Infallible;

    fn submit(&mut self, record: ScoreRecord) -> Result<(), Self::Error> {
        // ties keep submission order
        let index = self
            .records
            .partition_point(|existing| existing.score <= record.score);
        log::debug!(
            "New score {} for {} on {} at position {}",
            record.score,
            record.name,
            record.difficulty,
            index
        );
        self.records.insert(index, record);
        Ok(())
    }

    fn scores(&self) -> Result<Vec<ScoreRecord>, Self::Error> {
        Ok(self.records.clone())
    }
}
