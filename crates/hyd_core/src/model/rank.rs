//! Rank tiers derived from accumulated points.
//!
//! # Invariants
//! - Tier ranges are half-open, contiguous and ordered; every point total
//!   maps to exactly one tier.
//! - `Eternal` covers every total at or above the last bounded tier.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRank {
    Beginner,
    Apprentice,
    Responsible,
    HardWorker,
    ProAchiever,
    Master,
    Titan,
    Legendary,
    Mythic,
    Eternal,
}

/// Lower bound (inclusive) of each tier, ascending.
const RANK_TABLE: [(u32, UserRank); 10] = [
    (0, UserRank::Beginner),
    (10, UserRank::Apprentice),
    (50, UserRank::Responsible),
    (100, UserRank::HardWorker),
    (200, UserRank::ProAchiever),
    (500, UserRank::Master),
    (1_000, UserRank::Titan),
    (2_000, UserRank::Legendary),
    (5_000, UserRank::Mythic),
    (10_000, UserRank::Eternal),
];

impl UserRank {
    pub fn for_points(points: u32) -> Self {
        RANK_TABLE
            .iter()
            .rev()
            .find(|(floor, _)| points >= *floor)
            .map_or(Self::Beginner, |(_, rank)| *rank)
    }

    /// Inclusive lower bound of this tier.
    pub fn min_points(self) -> u32 {
        RANK_TABLE
            .iter()
            .find(|(_, rank)| *rank == self)
            .map_or(0, |(floor, _)| *floor)
    }

    /// Exclusive upper bound, `None` for the open-ended top tier.
    pub fn next_threshold(self) -> Option<u32> {
        RANK_TABLE
            .iter()
            .find(|(floor, _)| *floor > self.min_points())
            .map(|(floor, _)| *floor)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Apprentice => "Apprentice",
            Self::Responsible => "Responsible",
            Self::HardWorker => "Hard Worker",
            Self::ProAchiever => "Pro Achiever",
            Self::Master => "Master",
            Self::Titan => "Titan",
            Self::Legendary => "Legendary",
            Self::Mythic => "Mythic",
            Self::Eternal => "Eternal",
        }
    }
}

impl Display for UserRank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::UserRank;

    #[test]
    fn boundaries_land_in_the_upper_tier() {
        assert_eq!(UserRank::for_points(0), UserRank::Beginner);
        assert_eq!(UserRank::for_points(9), UserRank::Beginner);
        assert_eq!(UserRank::for_points(10), UserRank::Apprentice);
        assert_eq!(UserRank::for_points(499), UserRank::ProAchiever);
        assert_eq!(UserRank::for_points(500), UserRank::Master);
        assert_eq!(UserRank::for_points(9_999), UserRank::Mythic);
        assert_eq!(UserRank::for_points(10_000), UserRank::Eternal);
        assert_eq!(UserRank::for_points(u32::MAX), UserRank::Eternal);
    }

    #[test]
    fn rank_is_monotonic_over_points() {
        let mut previous = UserRank::for_points(0);
        for points in 1..=12_000 {
            let current = UserRank::for_points(points);
            assert!(current >= previous, "rank dropped at {points}");
            previous = current;
        }
    }

    #[test]
    fn thresholds_chain_without_gaps() {
        assert_eq!(UserRank::Beginner.next_threshold(), Some(10));
        assert_eq!(UserRank::Mythic.next_threshold(), Some(10_000));
        assert_eq!(UserRank::Eternal.next_threshold(), None);
        assert_eq!(
            UserRank::for_points(UserRank::Titan.next_threshold().unwrap()),
            UserRank::Legendary
        );
    }
}
