//! Persisted record types and the pure mapping to and from the aggregate.
//!
//! On disk, player entries inside a match are point-in-time snapshots, and a
//! match result is two `(label, points)` pairs where `0/0` means "not
//! decided yet". In memory that sentinel is
//! replaced by `Option<MatchOutcome>`, and loading rejects any point split
//! outside {1/0, 0/1, 0.5/0.5, 0/0}.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MatchOutcome, Pairing, Player, PlayerId, Round, Tournament};

const PLAYER1_LABEL: &str = "player1";
const PLAYER2_LABEL: &str = "player2";

/// Validation failures when turning a record back into a tournament.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("max_round must be positive")]
    InvalidMaxRound,

    #[error("duplicate player {0} in the player list")]
    DuplicatePlayer(PlayerId),

    #[error("round_number {stored} does not match the {actual} stored rounds")]
    RoundCountMismatch { stored: u32, actual: u32 },

    #[error("{actual} rounds stored but max_round is {max_round}")]
    TooManyRounds { actual: u32, max_round: u32 },

    #[error("round {found} stored where round {expected} was expected")]
    RoundOutOfSequence { expected: u32, found: u32 },

    #[error("round {round} match {number} references unknown player {player}")]
    UnknownPlayer {
        round: u32,
        number: u32,
        player: PlayerId,
    },

    #[error("round {round} match {number} pairs a player against themselves")]
    IdenticalPlayers { round: u32, number: u32 },

    #[error("round {round} match {number} has an invalid point split ({points1}, {points2})")]
    InvalidResult {
        round: u32,
        number: u32,
        points1: f64,
        points2: f64,
    },
}

/// One player, as stored in a tournament record or the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    /// National identifier
    pub identifier: PlayerId,

    /// Last name
    pub surname: String,

    /// First name
    pub first_name: String,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// Cumulative score
    pub score: f64,
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        Self {
            identifier: player.id.clone(),
            surname: player.surname.clone(),
            first_name: player.first_name.clone(),
            birth_date: player.birth_date,
            score: player.score(),
        }
    }
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Player::new(
            record.identifier,
            record.surname,
            record.first_name,
            record.birth_date,
        )
        .with_score(record.score)
    }
}

/// A `(label, points)` result entry; serializes as a two-element array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEntry(pub String, pub f64);

/// One match, with point-in-time player snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub match_number: u32,
    pub player1: PlayerRecord,
    pub player2: PlayerRecord,
    pub result: [ResultEntry; 2],
}

/// One round and its matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub round_number: u32,

    /// The ordering the pairing walk ran over
    pub players: Vec<PlayerId>,

    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub matches: Vec<MatchRecord>,
}

/// The whole persisted tournament, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TournamentRecord {
    pub name: String,
    pub place: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub round_number: u32,
    pub max_round: u32,
    pub players: Vec<PlayerRecord>,
    pub rounds: Vec<RoundRecord>,
}

impl From<&Tournament> for TournamentRecord {
    fn from(tournament: &Tournament) -> Self {
        let snapshot = |id: &PlayerId| -> PlayerRecord {
            tournament
                .player(id)
                .map(PlayerRecord::from)
                .expect("every paired player is registered in the tournament")
        };

        let rounds = tournament
            .rounds()
            .iter()
            .map(|round| RoundRecord {
                round_number: round.number(),
                players: round.players().to_vec(),
                started_at: round.started_at(),
                ended_at: round.ended_at(),
                matches: round
                    .pairings()
                    .iter()
                    .map(|m| {
                        let (points1, points2) = m.points().unwrap_or((0.0, 0.0));
                        MatchRecord {
                            match_number: m.number,
                            player1: snapshot(&m.player1),
                            player2: snapshot(&m.player2),
                            result: [
                                ResultEntry(PLAYER1_LABEL.to_string(), points1),
                                ResultEntry(PLAYER2_LABEL.to_string(), points2),
                            ],
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: tournament.name().to_string(),
            place: tournament.place().to_string(),
            description: tournament.description().to_string(),
            start_date: tournament.start_date(),
            end_date: tournament.end_date(),
            round_number: tournament.round_number(),
            max_round: tournament.max_round(),
            players: tournament.players().iter().map(PlayerRecord::from).collect(),
            rounds,
        }
    }
}

fn outcome_from_points(points1: f64, points2: f64) -> Option<Option<MatchOutcome>> {
    if points1 == 1.0 && points2 == 0.0 {
        Some(Some(MatchOutcome::Player1Win))
    } else if points1 == 0.0 && points2 == 1.0 {
        Some(Some(MatchOutcome::Player2Win))
    } else if points1 == 0.5 && points2 == 0.5 {
        Some(Some(MatchOutcome::Draw))
    } else if points1 == 0.0 && points2 == 0.0 {
        Some(None)
    } else {
        None
    }
}

impl TryFrom<TournamentRecord> for Tournament {
    type Error = RecordError;

    fn try_from(record: TournamentRecord) -> Result<Self, Self::Error> {
        if record.max_round == 0 {
            return Err(RecordError::InvalidMaxRound);
        }
        let actual = record.rounds.len() as u32;
        if record.round_number != actual {
            return Err(RecordError::RoundCountMismatch {
                stored: record.round_number,
                actual,
            });
        }
        if actual > record.max_round {
            return Err(RecordError::TooManyRounds {
                actual,
                max_round: record.max_round,
            });
        }

        let mut players: Vec<Player> = Vec::with_capacity(record.players.len());
        for player_record in record.players {
            if players.iter().any(|p| p.id == player_record.identifier) {
                return Err(RecordError::DuplicatePlayer(player_record.identifier));
            }
            players.push(Player::from(player_record));
        }

        let mut rounds: Vec<Round> = Vec::with_capacity(record.rounds.len());
        for (index, round_record) in record.rounds.into_iter().enumerate() {
            let expected = index as u32 + 1;
            if round_record.round_number != expected {
                return Err(RecordError::RoundOutOfSequence {
                    expected,
                    found: round_record.round_number,
                });
            }

            let mut pairings = Vec::with_capacity(round_record.matches.len());
            for m in round_record.matches {
                let round = round_record.round_number;
                let number = m.match_number;

                for snapshot in [&m.player1, &m.player2] {
                    if !players.iter().any(|p| p.id == snapshot.identifier) {
                        return Err(RecordError::UnknownPlayer {
                            round,
                            number,
                            player: snapshot.identifier.clone(),
                        });
                    }
                }
                if m.player1.identifier == m.player2.identifier {
                    return Err(RecordError::IdenticalPlayers { round, number });
                }

                let (points1, points2) = (m.result[0].1, m.result[1].1);
                let result = outcome_from_points(points1, points2).ok_or(
                    RecordError::InvalidResult {
                        round,
                        number,
                        points1,
                        points2,
                    },
                )?;

                // Opponent histories are derived, not stored: replay the
                // match history in chronological order.
                let (id1, id2) = (m.player1.identifier, m.player2.identifier);
                for player in &mut players {
                    if player.id == id1 {
                        player.record_opponent(id2.clone());
                    } else if player.id == id2 {
                        player.record_opponent(id1.clone());
                    }
                }

                pairings.push(Pairing::new(number, id1, id2).with_result(result));
            }

            rounds.push(Round::from_parts(
                round_record.round_number,
                round_record.players,
                pairings,
                round_record.started_at,
                round_record.ended_at,
            ));
        }

        Ok(Tournament::from_parts(
            record.name,
            record.place,
            record.description,
            record.start_date,
            record.end_date,
            record.max_round,
            players,
            rounds,
        ))
    }
}
