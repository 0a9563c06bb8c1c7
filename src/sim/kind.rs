//! Entity kinds and the fixed win relation
//!
//! Rock beats Scissors, Scissors beats Paper, Paper beats Rock. The relation
//! is a lookup table indexed by kind, not a chain of conditionals.

use serde::{Deserialize, Serialize};

/// One of the three RPS kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Rock,
    Paper,
    Scissors,
}

/// `BEATS[k]` is the kind that `k` converts on contact
const BEATS: [Kind; 3] = [Kind::Scissors, Kind::Rock, Kind::Paper];

impl Kind {
    /// All kinds in index order
    pub const ALL: [Kind; 3] = [Kind::Rock, Kind::Paper, Kind::Scissors];

    /// Stable index into per-kind arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The kind this one converts
    #[inline]
    pub fn prey(self) -> Kind {
        BEATS[self.index()]
    }

    #[inline]
    pub fn beats(self, other: Kind) -> bool {
        self.prey() == other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Rock => "Rock",
            Kind::Paper => "Paper",
            Kind::Scissors => "Scissors",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winner of an encounter between `a` and `b`, or `None` for same-kind contact
#[inline]
pub fn encounter(a: Kind, b: Kind) -> Option<Kind> {
    if a.beats(b) {
        Some(a)
    } else if b.beats(a) {
        Some(b)
    } else {
        None
    }
}
