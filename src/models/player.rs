//! Player model — identity, score, and opponent history.

use chrono::NaiveDate;

use super::PlayerId;

/// A tournament participant.
///
/// The [`Tournament`](super::Tournament) owns the canonical copy of every
/// player; score and opponent history are only mutated through it, so rounds
/// and matches can hold plain identifiers instead of shared mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// National identifier (unique key)
    pub id: PlayerId,

    /// Last name
    pub surname: String,

    /// First name
    pub first_name: String,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// Cumulative score: 1 per win, 0.5 per draw
    score: f64,

    /// Opponents already played, in chronological order
    opponents: Vec<PlayerId>,
}

impl Player {
    /// Create a new player with no score and no history.
    pub fn new(
        id: PlayerId,
        surname: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            surname: surname.into(),
            first_name: first_name.into(),
            birth_date,
            score: 0.0,
            opponents: Vec::new(),
        }
    }

    /// Builder method to set the score, used when rebuilding a player from a
    /// persisted record.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Opponents faced so far, oldest first.
    pub fn opponents(&self) -> &[PlayerId] {
        &self.opponents
    }

    /// Whether this player has already faced `other`.
    pub fn has_played(&self, other: &PlayerId) -> bool {
        self.opponents.iter().any(|id| id == other)
    }

    pub(crate) fn award(&mut self, points: f64) {
        self.score += points;
    }

    pub(crate) fn record_opponent(&mut self, opponent: PlayerId) {
        self.opponents.push(opponent);
    }
}
