//! The pairing engine.
//!
//! A pairing attempt is a pure function over an ordered player list and the
//! set of pairs that have already met: it either yields a complete set of
//! N/2 matches or fails without touching any player state. When the greedy
//! walk over the supplied ordering cannot cover everyone, the engine retries
//! with a fixed ladder of reorderings before declaring the round impossible.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::models::{Player, PlayerId};

/// Pairing failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// Every ordering in the retry ladder produced an incomplete pairing:
    /// some player has no legal partner left. Fatal for the round.
    #[error("no legal pairing after {attempts} orderings; every remaining combination is a rematch")]
    Exhausted { attempts: usize },
}

/// Unordered pairs of players that have already faced each other.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenPairs(HashSet<(PlayerId, PlayerId)>);

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &PlayerId, b: &PlayerId) -> (PlayerId, PlayerId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    pub fn insert(&mut self, a: &PlayerId, b: &PlayerId) {
        self.0.insert(Self::key(a, b));
    }

    /// Whether `a` and `b` have met, in either order.
    pub fn contains(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.0.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A complete pairing: the ordering that produced it and the matched pairs
/// in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingOutcome {
    /// The player ordering the successful walk ran over
    pub order: Vec<PlayerId>,

    /// N/2 pairs, each guaranteed not to be a rematch
    pub pairs: Vec<(PlayerId, PlayerId)>,
}

/// Reorderings tried, in order, when the supplied ordering deadlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reorder {
    ScoreAscending,
    SurnameAscending,
    SurnameDescending,
    IdAscending,
    IdDescending,
}

const RETRY_LADDER: [Reorder; 5] = [
    Reorder::ScoreAscending,
    Reorder::SurnameAscending,
    Reorder::SurnameDescending,
    Reorder::IdAscending,
    Reorder::IdDescending,
];

fn reorder(players: &mut [&Player], strategy: Reorder) {
    match strategy {
        Reorder::ScoreAscending => players.sort_by(|a, b| a.score().total_cmp(&b.score())),
        Reorder::SurnameAscending => players.sort_by(|a, b| a.surname.cmp(&b.surname)),
        Reorder::SurnameDescending => players.sort_by(|a, b| b.surname.cmp(&a.surname)),
        Reorder::IdAscending => players.sort_by(|a, b| a.id.cmp(&b.id)),
        Reorder::IdDescending => players.sort_by(|a, b| b.id.cmp(&a.id)),
    }
}

/// One greedy pairing walk.
///
/// Walks the ordering left to right and pairs each unmatched player with the
/// first later player it has not met. Returns `None` when the walk leaves
/// anyone unmatched.
pub fn try_pair(
    ordered: &[&Player],
    forbidden: &ForbiddenPairs,
) -> Option<Vec<(PlayerId, PlayerId)>> {
    let mut used = vec![false; ordered.len()];
    let mut pairs = Vec::with_capacity(ordered.len() / 2);

    for i in 0..ordered.len() {
        if used[i] {
            continue;
        }
        for j in (i + 1)..ordered.len() {
            if used[j] {
                continue;
            }
            if forbidden.contains(&ordered[i].id, &ordered[j].id) {
                continue;
            }
            used[i] = true;
            used[j] = true;
            pairs.push((ordered[i].id.clone(), ordered[j].id.clone()));
            break;
        }
    }

    (pairs.len() == ordered.len() / 2).then_some(pairs)
}

/// Pair an even-sized pool, retrying with the reorder ladder on deadlock.
///
/// Tries the supplied ordering first, then each ladder entry in turn.
/// Returns the ordering that succeeded together with the pairs, so callers
/// can record which ordering the round was actually built from.
pub fn pair_with_retries(
    ordered: &[&Player],
    forbidden: &ForbiddenPairs,
) -> Result<PairingOutcome, PairingError> {
    let mut current: Vec<&Player> = ordered.to_vec();

    if let Some(pairs) = try_pair(&current, forbidden) {
        return Ok(outcome(&current, pairs));
    }

    for (attempt, strategy) in RETRY_LADDER.iter().enumerate() {
        debug!(
            attempt = attempt + 1,
            ?strategy,
            "pairing walk incomplete, retrying with reordered players"
        );
        reorder(&mut current, *strategy);
        if let Some(pairs) = try_pair(&current, forbidden) {
            return Ok(outcome(&current, pairs));
        }
    }

    Err(PairingError::Exhausted {
        attempts: 1 + RETRY_LADDER.len(),
    })
}

fn outcome(order: &[&Player], pairs: Vec<(PlayerId, PlayerId)>) -> PairingOutcome {
    PairingOutcome {
        order: order.iter().map(|p| p.id.clone()).collect(),
        pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn player(id: &str, surname: &str, score: f64) -> Player {
        Player::new(
            PlayerId::new(id).unwrap(),
            surname,
            "Test",
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        )
        .with_score(score)
    }

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s).unwrap()
    }

    #[test]
    fn test_pairs_adjacent_players_when_nothing_forbidden() {
        let players = vec![
            player("aa00001", "Adams", 0.0),
            player("aa00002", "Brown", 0.0),
            player("aa00003", "Clark", 0.0),
            player("aa00004", "Davis", 0.0),
        ];
        let refs: Vec<&Player> = players.iter().collect();

        let pairs = try_pair(&refs, &ForbiddenPairs::new()).unwrap();
        assert_eq!(
            pairs,
            vec![
                (id("aa00001"), id("aa00002")),
                (id("aa00003"), id("aa00004")),
            ]
        );
    }

    #[test]
    fn test_skips_forbidden_pair() {
        let players = vec![
            player("aa00001", "Adams", 0.0),
            player("aa00002", "Brown", 0.0),
            player("aa00003", "Clark", 0.0),
            player("aa00004", "Davis", 0.0),
        ];
        let refs: Vec<&Player> = players.iter().collect();
        let mut forbidden = ForbiddenPairs::new();
        forbidden.insert(&id("aa00001"), &id("aa00002"));

        let pairs = try_pair(&refs, &forbidden).unwrap();
        assert_eq!(
            pairs,
            vec![
                (id("aa00001"), id("aa00003")),
                (id("aa00002"), id("aa00004")),
            ]
        );
    }

    #[test]
    fn test_greedy_deadlock_returns_none() {
        // 1 pairs with 2, leaving 3 and 4 who have already met.
        let players = vec![
            player("aa00001", "Adams", 0.0),
            player("aa00002", "Brown", 0.0),
            player("aa00003", "Clark", 0.0),
            player("aa00004", "Davis", 0.0),
        ];
        let refs: Vec<&Player> = players.iter().collect();
        let mut forbidden = ForbiddenPairs::new();
        forbidden.insert(&id("aa00003"), &id("aa00004"));

        assert!(try_pair(&refs, &forbidden).is_none());
    }

    #[test]
    fn test_retry_ladder_recovers_from_deadlock() {
        // Initial order deadlocks (3 and 4 left facing a rematch), but a
        // reordering separates them.
        let players = vec![
            player("aa00001", "Davis", 1.0),
            player("aa00002", "Clark", 1.0),
            player("aa00003", "Brown", 0.0),
            player("aa00004", "Adams", 0.0),
        ];
        let refs: Vec<&Player> = players.iter().collect();
        let mut forbidden = ForbiddenPairs::new();
        forbidden.insert(&id("aa00003"), &id("aa00004"));

        let result = pair_with_retries(&refs, &forbidden).unwrap();
        assert_eq!(result.pairs.len(), 2);
        for (a, b) in &result.pairs {
            assert!(!forbidden.contains(a, b));
        }
        // The successful ordering is what the round should record.
        assert_eq!(result.order.len(), 4);
    }

    #[test]
    fn test_exhaustion_after_all_orderings() {
        // Every possible pair has already met: no ordering can help.
        let players = vec![
            player("aa00001", "Adams", 1.5),
            player("aa00002", "Brown", 1.0),
            player("aa00003", "Clark", 0.5),
            player("aa00004", "Davis", 0.0),
        ];
        let refs: Vec<&Player> = players.iter().collect();
        let mut forbidden = ForbiddenPairs::new();
        for a in &players {
            for b in &players {
                if a.id < b.id {
                    forbidden.insert(&a.id, &b.id);
                }
            }
        }

        assert_eq!(
            pair_with_retries(&refs, &forbidden),
            Err(PairingError::Exhausted { attempts: 6 })
        );
    }

    #[test]
    fn test_every_player_appears_exactly_once() {
        let players: Vec<Player> = (1..=8)
            .map(|n| player(&format!("aa0000{}", n), "Name", 0.0))
            .collect();
        let refs: Vec<&Player> = players.iter().collect();

        let pairs = try_pair(&refs, &ForbiddenPairs::new()).unwrap();
        let mut seen = HashSet::new();
        for (a, b) in &pairs {
            assert!(seen.insert(a.clone()));
            assert!(seen.insert(b.clone()));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_forbidden_pairs_symmetric() {
        let mut forbidden = ForbiddenPairs::new();
        forbidden.insert(&id("aa00002"), &id("aa00001"));
        assert!(forbidden.contains(&id("aa00001"), &id("aa00002")));
        assert!(forbidden.contains(&id("aa00002"), &id("aa00001")));
        assert_eq!(forbidden.len(), 1);
    }

    #[test]
    fn test_empty_pool_pairs_to_nothing() {
        let refs: Vec<&Player> = Vec::new();
        let pairs = try_pair(&refs, &ForbiddenPairs::new()).unwrap();
        assert!(pairs.is_empty());
    }
}
