//! Pairing model — one match between two players in a round.

use super::PlayerId;

/// The decided outcome of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Player1Win,
    Player2Win,
    Draw,
}

impl MatchOutcome {
    /// Points awarded to (player1, player2). Always sums to exactly 1.0.
    pub fn points(&self) -> (f64, f64) {
        match self {
            MatchOutcome::Player1Win => (1.0, 0.0),
            MatchOutcome::Player2Win => (0.0, 1.0),
            MatchOutcome::Draw => (0.5, 0.5),
        }
    }
}

/// A single match between two players.
///
/// Holds identifiers only; the canonical [`Player`](super::Player) records
/// live in the tournament. An undecided match carries no result at all, so
/// "no result yet" cannot be confused with a zero-zero score line.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    /// 1-based sequence number within the round
    pub number: u32,

    /// First player of the ordered pair
    pub player1: PlayerId,

    /// Second player of the ordered pair
    pub player2: PlayerId,

    /// Outcome, once assigned
    result: Option<MatchOutcome>,
}

impl Pairing {
    /// Create an undecided pairing.
    pub fn new(number: u32, player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            number,
            player1,
            player2,
            result: None,
        }
    }

    pub fn result(&self) -> Option<MatchOutcome> {
        self.result
    }

    pub fn is_decided(&self) -> bool {
        self.result.is_some()
    }

    /// Whether `id` plays in this match.
    pub fn involves(&self, id: &PlayerId) -> bool {
        self.player1 == *id || self.player2 == *id
    }

    /// Points awarded to (player1, player2), if decided.
    pub fn points(&self) -> Option<(f64, f64)> {
        self.result.map(|r| r.points())
    }

    pub(crate) fn decide(&mut self, outcome: MatchOutcome) {
        self.result = Some(outcome);
    }

    pub(crate) fn with_result(mut self, result: Option<MatchOutcome>) -> Self {
        self.result = result;
        self
    }
}
