use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// How often something was seen and how often it was on the winning side.
///
/// This is the only value type that flows through aggregation. Counts are
/// stored raw, never as rates, so partial results can always be merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    pub count: u64,
    pub wins: u64,
}

impl Tally {
    pub fn new(count: u64, wins: u64) -> Self {
        Self { count, wins }
    }

    /// One occurrence, won when `win` is 1.
    pub fn single(win: u64) -> Self {
        Self { count: 1, wins: win }
    }

    /// Component wise sum. Associative and commutative.
    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            count: self.count + other.count,
            wins: self.wins + other.wins,
        }
    }

    /// Win percentage, or `None` when nothing was counted.
    pub fn win_rate(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.wins as f64 / self.count as f64 * 100.0)
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        self.merge(rhs)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = self.merge(rhs);
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Tally {
        iter.fold(Tally::default(), Tally::merge)
    }
}

/// Merge two tallies.
pub fn merge(a: Tally, b: Tally) -> Tally {
    a.merge(b)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn random_tally(rng: &mut StdRng) -> Tally {
        let count = rng.gen_range(0..1_000);
        Tally::new(count, rng.gen_range(0..=count))
    }

    #[test]
    fn test_merge_adds_components() {
        assert_eq!(Tally::new(5, 3), merge(Tally::new(2, 1), Tally::new(3, 2)));
        assert_eq!(Tally::new(2, 1), Tally::single(1) + Tally::single(0));
    }

    #[test]
    fn test_merge_is_associative_and_commutative() {
        let mut rng = StdRng::seed_from_u64(420);
        for _ in 0..1_000 {
            let a = random_tally(&mut rng);
            let b = random_tally(&mut rng);
            let c = random_tally(&mut rng);
            assert_eq!(merge(merge(a, b), c), merge(a, merge(b, c)));
            assert_eq!(merge(a, b), merge(b, a));
        }
    }

    #[test]
    fn test_default_is_identity() {
        let t = Tally::new(7, 4);
        assert_eq!(t, merge(t, Tally::default()));
    }

    #[test]
    fn test_sum_and_add_assign() {
        let total: Tally = vec![Tally::single(1), Tally::single(0), Tally::new(3, 3)]
            .into_iter()
            .sum();
        assert_eq!(Tally::new(5, 4), total);

        let mut t = Tally::default();
        t += Tally::single(1);
        assert_eq!(Tally::new(1, 1), t);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(None, Tally::default().win_rate());
        approx::assert_relative_eq!(25.0, Tally::new(4, 1).win_rate().unwrap());
    }
}
