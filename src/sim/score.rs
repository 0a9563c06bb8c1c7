//! Live per-kind tallies and the cross-round win record

use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::Kind;
use super::state::Entity;

/// Entities currently holding each kind. Always sums to the population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub rock: usize,
    pub paper: usize,
    pub scissors: usize,
}

impl ScoreBoard {
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut board = Self::default();
        for e in entities {
            *board.slot(e.kind) += 1;
        }
        board
    }

    fn slot(&mut self, kind: Kind) -> &mut usize {
        match kind {
            Kind::Rock => &mut self.rock,
            Kind::Paper => &mut self.paper,
            Kind::Scissors => &mut self.scissors,
        }
    }

    pub fn get(&self, kind: Kind) -> usize {
        match kind {
            Kind::Rock => self.rock,
            Kind::Paper => self.paper,
            Kind::Scissors => self.scissors,
        }
    }

    pub fn total(&self) -> usize {
        self.rock + self.paper + self.scissors
    }

    /// `(kind, count)` in kind order
    pub fn iter(&self) -> impl Iterator<Item = (Kind, usize)> + '_ {
        Kind::ALL.into_iter().map(|k| (k, self.get(k)))
    }

    /// Kinds with at least one entity
    pub fn alive(&self) -> impl Iterator<Item = Kind> + '_ {
        self.iter().filter(|&(_, n)| n > 0).map(|(k, _)| k)
    }

    /// The only surviving kind, if exactly one remains
    pub fn winner(&self) -> Option<Kind> {
        let mut alive = self.alive();
        match (alive.next(), alive.next()) {
            (Some(kind), None) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for ScoreBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rock: {}   Paper: {}   Scissors: {}",
            self.rock, self.paper, self.scissors
        )
    }
}

/// Rounds won per kind, kept across resets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTally {
    pub rock: u32,
    pub paper: u32,
    pub scissors: u32,
}

impl WinTally {
    pub fn add_win(&mut self, kind: Kind) {
        match kind {
            Kind::Rock => self.rock += 1,
            Kind::Paper => self.paper += 1,
            Kind::Scissors => self.scissors += 1,
        }
    }

    pub fn get(&self, kind: Kind) -> u32 {
        match kind {
            Kind::Rock => self.rock,
            Kind::Paper => self.paper,
            Kind::Scissors => self.scissors,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rock + self.paper + self.scissors
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
