//! Round model — one generation of pairings over the player pool.

use chrono::{DateTime, Utc};

use super::{Pairing, PlayerId};

/// A tournament round.
///
/// Created with its matches already paired; transitions to ended exactly
/// once, after every match has a result, and is immutable from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// 1-based round number
    number: u32,

    /// The player ordering the pairing was generated from
    players: Vec<PlayerId>,

    /// Matches, in board order
    pairings: Vec<Pairing>,

    /// When the round was generated
    started_at: DateTime<Utc>,

    /// When the round was closed; `None` while open
    ended_at: Option<DateTime<Utc>>,
}

impl Round {
    pub(crate) fn new(number: u32, players: Vec<PlayerId>, pairings: Vec<Pairing>) -> Self {
        Self {
            number,
            players,
            pairings,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Rebuild a round from persisted parts.
    pub(crate) fn from_parts(
        number: u32,
        players: Vec<PlayerId>,
        pairings: Vec<Pairing>,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            number,
            players,
            pairings,
            started_at,
            ended_at,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Human-readable name, e.g. "round 1".
    pub fn display_name(&self) -> String {
        format!("round {}", self.number)
    }

    /// The ordering the pairing walk ran over.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Number of matches still waiting for a result. Closure is legal only
    /// when this reaches zero.
    pub fn pending_results(&self) -> usize {
        self.pairings.iter().filter(|m| !m.is_decided()).count()
    }

    pub(crate) fn pairing_mut(&mut self, number: u32) -> Option<&mut Pairing> {
        self.pairings.iter_mut().find(|m| m.number == number)
    }

    pub(crate) fn close(&mut self) {
        self.ended_at = Some(Utc::now());
    }
}
