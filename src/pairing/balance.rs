//! Team-split helpers for four selected players

use crate::types::Player;

/// One way of dividing four players into two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub team_one: [usize; 2],
    pub team_two: [usize; 2],
}

impl Split {
    /// Absolute rating-sum gap between the two teams
    pub fn gap(&self, players: &[Player; 4]) -> f64 {
        let sum = |idx: [usize; 2]| players[idx[0]].rating + players[idx[1]].rating;
        (sum(self.team_one) - sum(self.team_two)).abs()
    }
}

/// The three 2v2 partitions of `[anchor, partner, opp1, opp2]`.
///
/// The two crossed splits come first so that on equal gaps the anchor and the
/// partner end up on opposite sides.
pub const SPLITS: [Split; 3] = [
    Split {
        team_one: [0, 2],
        team_two: [1, 3],
    },
    Split {
        team_one: [0, 3],
        team_two: [1, 2],
    },
    Split {
        team_one: [0, 1],
        team_two: [2, 3],
    },
];

/// Pick the split with the smallest gap; ties resolve to the earlier split
pub fn best_split(players: &[Player; 4]) -> Split {
    let mut best = SPLITS[0];
    let mut best_gap = best.gap(players);
    for split in &SPLITS[1..] {
        let gap = split.gap(players);
        if gap < best_gap {
            best = *split;
            best_gap = gap;
        }
    }
    best
}

/// Smallest gap any 2v2 partition of these four players can reach
pub fn minimum_gap(players: &[Player; 4]) -> f64 {
    SPLITS
        .iter()
        .map(|split| split.gap(players))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four(ratings: [f64; 4]) -> [Player; 4] {
        let mut i = 0;
        ratings.map(|rating| {
            i += 1;
            Player::new(format!("p{}", i), format!("Player {}", i), rating)
        })
    }

    #[test]
    fn test_best_split_crossed() {
        // anchor 1600, partner 1400, opponents 1500 and 1300
        let players = four([1600.0, 1400.0, 1500.0, 1300.0]);
        let split = best_split(&players);

        assert_eq!(split, SPLITS[1]);
        assert_eq!(split.gap(&players), 0.0);
    }

    #[test]
    fn test_best_split_keeps_partners_when_better() {
        let players = four([2000.0, 1500.0, 1800.0, 1700.0]);
        let split = best_split(&players);

        assert_eq!(split, SPLITS[2]);
        assert_eq!(split.gap(&players), 0.0);
    }

    #[test]
    fn test_tie_prefers_first_split() {
        let players = four([1500.0, 1500.0, 1500.0, 1500.0]);
        assert_eq!(best_split(&players), SPLITS[0]);
    }

    #[test]
    fn test_minimum_gap() {
        let players = four([1600.0, 1590.0, 1010.0, 1000.0]);
        assert_eq!(minimum_gap(&players), 0.0);
        assert_eq!(best_split(&players).gap(&players), minimum_gap(&players));
    }
}
