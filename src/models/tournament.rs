//! Tournament aggregate — players, rounds, and both lifecycle state machines.

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::pairing::{self, ForbiddenPairs, PairingError};

use super::{MatchOutcome, Pairing, Player, PlayerId, Round};

/// Errors reported by tournament operations. All are recoverable by the
/// caller; none mutate state when returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TournamentError {
    #[error("max_round must be positive")]
    InvalidMaxRound,

    #[error("player {0} is already registered in this tournament")]
    AlreadyRegistered(PlayerId),

    #[error("registration is closed once the first round has been paired")]
    RegistrationClosed,

    #[error("the tournament has started; settings can no longer be changed")]
    SettingsLocked,

    #[error("a round needs at least two players, got {0}")]
    NotEnoughPlayers(usize),

    #[error("cannot pair an odd number of players ({0})")]
    OddPlayerCount(usize),

    #[error("round {0} is still open")]
    PreviousRoundNotEnded(u32),

    #[error("all {0} configured rounds have been played")]
    MaxRoundsReached(u32),

    #[error(transparent)]
    PairingImpossible(#[from] PairingError),

    #[error("no round has been started yet")]
    NoRoundsStarted,

    #[error("no match number {0} in the current round")]
    InvalidMatchNumber(u32),

    #[error("round {0} has ended; its results are final")]
    RoundAlreadyEnded(u32),

    #[error("match {0} already has a result")]
    MatchAlreadyDecided(u32),

    #[error("{0} matches are still waiting for a result")]
    MatchesStillPending(usize),

    #[error("{remaining} of {max_round} rounds remain to be played")]
    RoundsRemaining { remaining: u32, max_round: u32 },

    #[error("the tournament has ended")]
    TournamentEnded,
}

/// Where a tournament sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentState {
    /// No rounds yet; players can still register
    Registering,
    /// Rounds are being played; the player list is frozen
    InProgress,
    /// Terminal; end date is set
    Ended,
}

/// One row of the rankings, derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// 1-based rank after a stable descending-score sort
    pub rank: u32,
    pub id: PlayerId,
    pub surname: String,
    pub first_name: String,
    pub score: f64,
}

/// A Swiss-system tournament.
///
/// Owns the canonical [`Player`] records; every score or opponent-history
/// mutation goes through a method here, so rounds and matches never hold
/// aliased mutable player state.
#[derive(Debug, Clone, PartialEq)]
pub struct Tournament {
    name: String,
    place: String,
    description: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    max_round: u32,
    players: Vec<Player>,
    rounds: Vec<Round>,
}

impl Tournament {
    /// Create a tournament. `max_round` must be positive.
    pub fn new(
        name: impl Into<String>,
        place: impl Into<String>,
        description: impl Into<String>,
        max_round: u32,
    ) -> Result<Self, TournamentError> {
        if max_round == 0 {
            return Err(TournamentError::InvalidMaxRound);
        }
        Ok(Self {
            name: name.into(),
            place: place.into(),
            description: description.into(),
            start_date: Utc::now().date_naive(),
            end_date: None,
            max_round,
            players: Vec::new(),
            rounds: Vec::new(),
        })
    }

    /// Rebuild a tournament from persisted parts. The storage layer is
    /// responsible for validating the record first.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        place: String,
        description: String,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        max_round: u32,
        players: Vec<Player>,
        rounds: Vec<Round>,
    ) -> Self {
        Self {
            name,
            place,
            description,
            start_date,
            end_date,
            max_round,
            players,
            rounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn max_round(&self) -> u32 {
        self.max_round
    }

    /// Number of rounds generated so far.
    pub fn round_number(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn state(&self) -> TournamentState {
        if self.end_date.is_some() {
            TournamentState::Ended
        } else if self.rounds.is_empty() {
            TournamentState::Registering
        } else {
            TournamentState::InProgress
        }
    }

    /// Register a player. Only legal before the first round is paired.
    pub fn register(&mut self, player: Player) -> Result<(), TournamentError> {
        if self.end_date.is_some() {
            return Err(TournamentError::TournamentEnded);
        }
        if !self.rounds.is_empty() {
            return Err(TournamentError::RegistrationClosed);
        }
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(TournamentError::AlreadyRegistered(player.id));
        }
        debug!(player = %player.id, tournament = %self.name, "registered player");
        self.players.push(player);
        Ok(())
    }

    /// Generate the next round.
    ///
    /// Round 1 shuffles the players once with the supplied source of
    /// randomness; later rounds run a stable descending-score sort. The
    /// pairing itself is a pure attempt: on failure nothing is mutated, on
    /// success the round is appended and both players of every match get
    /// their opponent history extended.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&Round, TournamentError> {
        if self.end_date.is_some() {
            return Err(TournamentError::TournamentEnded);
        }
        if self.round_number() >= self.max_round {
            return Err(TournamentError::MaxRoundsReached(self.max_round));
        }
        if self.players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers(self.players.len()));
        }
        if self.players.len() % 2 != 0 {
            return Err(TournamentError::OddPlayerCount(self.players.len()));
        }
        if let Some(last) = self.rounds.last() {
            if !last.is_ended() {
                return Err(TournamentError::PreviousRoundNotEnded(last.number()));
            }
        }

        let mut ordered: Vec<&Player> = self.players.iter().collect();
        if self.rounds.is_empty() {
            ordered.shuffle(rng);
        } else {
            // Stable sort: ties keep their registration-relative order.
            ordered.sort_by(|a, b| b.score().total_cmp(&a.score()));
        }

        let mut forbidden = ForbiddenPairs::new();
        for round in &self.rounds {
            for m in round.pairings() {
                forbidden.insert(&m.player1, &m.player2);
            }
        }

        let outcome = pairing::pair_with_retries(&ordered, &forbidden)?;

        for (a, b) in &outcome.pairs {
            for player in &mut self.players {
                if player.id == *a {
                    player.record_opponent(b.clone());
                } else if player.id == *b {
                    player.record_opponent(a.clone());
                }
            }
        }

        let number = self.round_number() + 1;
        let pairings = outcome
            .pairs
            .into_iter()
            .enumerate()
            .map(|(i, (a, b))| Pairing::new(i as u32 + 1, a, b))
            .collect();
        self.rounds.push(Round::new(number, outcome.order, pairings));
        info!(tournament = %self.name, round = number, "round paired");

        let idx = self.rounds.len() - 1;
        Ok(&self.rounds[idx])
    }

    /// Record the outcome of a match in the current round and award the
    /// corresponding points. A decided match cannot be re-assigned.
    pub fn assign_result(
        &mut self,
        match_number: u32,
        outcome: MatchOutcome,
    ) -> Result<(), TournamentError> {
        let round = self
            .rounds
            .last_mut()
            .ok_or(TournamentError::NoRoundsStarted)?;
        if round.is_ended() {
            return Err(TournamentError::RoundAlreadyEnded(round.number()));
        }
        let pairing = round
            .pairing_mut(match_number)
            .ok_or(TournamentError::InvalidMatchNumber(match_number))?;
        if pairing.is_decided() {
            return Err(TournamentError::MatchAlreadyDecided(match_number));
        }

        pairing.decide(outcome);
        let (p1, p2) = (pairing.player1.clone(), pairing.player2.clone());
        let (points1, points2) = outcome.points();

        for player in &mut self.players {
            if player.id == p1 {
                player.award(points1);
            } else if player.id == p2 {
                player.award(points2);
            }
        }
        debug!(match_number, "result recorded");
        Ok(())
    }

    /// Close the current round. Legal only once every match has a result.
    pub fn close_round(&mut self) -> Result<(), TournamentError> {
        let round = self
            .rounds
            .last_mut()
            .ok_or(TournamentError::NoRoundsStarted)?;
        if round.is_ended() {
            return Err(TournamentError::RoundAlreadyEnded(round.number()));
        }
        let pending = round.pending_results();
        if pending > 0 {
            return Err(TournamentError::MatchesStillPending(pending));
        }
        round.close();
        info!(round = round.number(), "round closed");
        Ok(())
    }

    /// End the tournament and return the final standings. Legal only once
    /// all configured rounds have been played and the last one is closed.
    pub fn end_tournament(&mut self) -> Result<Vec<Standing>, TournamentError> {
        if self.end_date.is_some() {
            return Err(TournamentError::TournamentEnded);
        }
        let played = self.round_number();
        if played < self.max_round {
            return Err(TournamentError::RoundsRemaining {
                remaining: self.max_round - played,
                max_round: self.max_round,
            });
        }
        if let Some(last) = self.rounds.last() {
            if !last.is_ended() {
                return Err(TournamentError::PreviousRoundNotEnded(last.number()));
            }
        }
        self.end_date = Some(Utc::now().date_naive());
        info!(tournament = %self.name, "tournament ended");
        Ok(self.standings())
    }

    /// Rankings by descending score, derived on demand. Ties keep their
    /// registration-relative order; no further tiebreak is applied.
    pub fn standings(&self) -> Vec<Standing> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranked
            .into_iter()
            .enumerate()
            .map(|(i, p)| Standing {
                rank: i as u32 + 1,
                id: p.id.clone(),
                surname: p.surname.clone(),
                first_name: p.first_name.clone(),
                score: p.score(),
            })
            .collect()
    }

    /// Rename the tournament. Only legal before the first round.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), TournamentError> {
        self.ensure_editable()?;
        self.name = name.into();
        Ok(())
    }

    /// Change the venue. Only legal before the first round.
    pub fn set_place(&mut self, place: impl Into<String>) -> Result<(), TournamentError> {
        self.ensure_editable()?;
        self.place = place.into();
        Ok(())
    }

    /// Change the description. Only legal before the first round.
    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), TournamentError> {
        self.ensure_editable()?;
        self.description = description.into();
        Ok(())
    }

    /// Change the configured round count. Only legal before the first round.
    pub fn set_max_round(&mut self, max_round: u32) -> Result<(), TournamentError> {
        self.ensure_editable()?;
        if max_round == 0 {
            return Err(TournamentError::InvalidMaxRound);
        }
        self.max_round = max_round;
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), TournamentError> {
        if !self.rounds.is_empty() || self.end_date.is_some() {
            return Err(TournamentError::SettingsLocked);
        }
        Ok(())
    }
}
