use serde::{Deserialize, Serialize};

/// The last contracted round. After it ends, the game is over.
pub const FINAL_ROUND: u8 = 6;

/// The meld shapes a player must lay down in one action to go down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub sets: usize,
    pub runs: usize,
}

const TABLE: [Contract; FINAL_ROUND as usize] = [
    Contract { sets: 2, runs: 0 },
    Contract { sets: 1, runs: 1 },
    Contract { sets: 0, runs: 2 },
    Contract { sets: 3, runs: 0 },
    Contract { sets: 2, runs: 1 },
    Contract { sets: 1, runs: 2 },
];

impl Contract {
    /// The contract for round 1..=6.
    pub fn for_round(round: u8) -> Contract {
        debug_assert!((1..=FINAL_ROUND).contains(&round));
        TABLE[(round.clamp(1, FINAL_ROUND) - 1) as usize]
    }

    /// True when a lay-down proposes exactly the required counts.
    pub fn matches(&self, sets: usize, runs: usize) -> bool {
        sets == self.sets && runs == self.runs
    }

    pub fn describe(&self) -> &'static str {
        match (self.sets, self.runs) {
            (2, 0) => "2 sets",
            (1, 1) => "1 set, 1 run",
            (0, 2) => "2 runs",
            (3, 0) => "3 sets",
            (2, 1) => "2 sets, 1 run",
            (1, 2) => "1 set, 2 runs",
            _ => "custom contract",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_table() {
        assert_eq!(Contract::for_round(1), Contract { sets: 2, runs: 0 });
        assert_eq!(Contract::for_round(2), Contract { sets: 1, runs: 1 });
        assert_eq!(Contract::for_round(3), Contract { sets: 0, runs: 2 });
        assert_eq!(Contract::for_round(4), Contract { sets: 3, runs: 0 });
        assert_eq!(Contract::for_round(5), Contract { sets: 2, runs: 1 });
        assert_eq!(Contract::for_round(6), Contract { sets: 1, runs: 2 });
    }

    #[test]
    fn test_matches_requires_exact_counts() {
        let contract = Contract::for_round(2);
        assert!(contract.matches(1, 1));
        assert!(!contract.matches(2, 0));
        assert!(!contract.matches(1, 2));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Contract::for_round(1).describe(), "2 sets");
        assert_eq!(Contract::for_round(6).describe(), "1 set, 2 runs");
    }
}
