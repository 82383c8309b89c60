//! Does the matchmaking look random?
//!
//! If decks were paired independently of each other, every observed count
//! would sit near its expected count and a least squares line through
//! `(expected, observed)` would have a slope close to one.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::join::JoinedStat;

/// Rows expecting fewer meetings than this are too noisy to fit.
pub const MIN_EXPECTED_COUNT: f64 = 0.01;

/// Least squares fit of `observed = slope * expected + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Zero when the observed counts have no variance.
    pub r_squared: f64,
    /// Rows used in the fit
    pub samples: usize,
}

/// How the fitted slope reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchmakingVerdict {
    /// Slope in `[0.9, 1.1]`.
    Random,
    /// Slope in `[0.45, 0.55]`: every expectation is twice too large, which
    /// is what forgetting that each game produced two edges looks like.
    HalvedExpectation,
    /// Anything else. Decks attract or avoid each other.
    Biased,
}

impl Regression {
    /// Fit every row whose expected count, at the two decimals the stats
    /// stream carries, is above `min_expected`.
    ///
    /// Returns `None` with fewer than two usable rows or when all of them
    /// share the same expected count.
    pub fn fit(stats: &[JoinedStat], min_expected: f64) -> Option<Regression> {
        let points: Vec<(f64, f64)> = stats
            .iter()
            .map(|s| (s.rounded_expected(), s.observed.count as f64))
            .filter(|(expected, _)| *expected > min_expected)
            .collect();
        Self::fit_points(&points)
    }

    fn fit_points(points: &[(f64, f64)]) -> Option<Regression> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let r_squared = if syy == 0.0 {
            0.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };
        Some(Regression {
            slope,
            intercept: mean_y - slope * mean_x,
            r_squared,
            samples: points.len(),
        })
    }

    pub fn verdict(&self) -> MatchmakingVerdict {
        MatchmakingVerdict::from_slope(self.slope)
    }
}

impl MatchmakingVerdict {
    pub fn from_slope(slope: f64) -> Self {
        if (0.9..=1.1).contains(&slope) {
            MatchmakingVerdict::Random
        } else if (0.45..=0.55).contains(&slope) {
            MatchmakingVerdict::HalvedExpectation
        } else {
            MatchmakingVerdict::Biased
        }
    }
}

impl fmt::Display for MatchmakingVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MatchmakingVerdict::Random => "matchmaking looks random",
            MatchmakingVerdict::HalvedExpectation => {
                "slope near 0.5, expected counts are likely off by a factor of two"
            }
            MatchmakingVerdict::Biased => "slope far from 1, some decks attract or avoid each other",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::aggregate::Tally;

    fn stat(expected_count: f64, observed: u64) -> JoinedStat {
        JoinedStat {
            source: "aa".into(),
            target: "bb".into(),
            observed: Tally::new(observed, 0),
            count_source: 1,
            count_target: 1,
            expected_count,
        }
    }

    #[test]
    fn test_perfect_fit() {
        let stats: Vec<_> = (1..=5).map(|i| stat(i as f64, i)).collect();
        let fit = Regression::fit(&stats, MIN_EXPECTED_COUNT).unwrap();

        assert_relative_eq!(1.0, fit.slope);
        assert_abs_diff_eq!(0.0, fit.intercept, epsilon = 1e-12);
        assert_relative_eq!(1.0, fit.r_squared);
        assert_eq!(5, fit.samples);
        assert_eq!(MatchmakingVerdict::Random, fit.verdict());
    }

    #[test]
    fn test_halved_slope() {
        let stats: Vec<_> = (1..=4).map(|i| stat(4.0 * i as f64, 2 * i)).collect();
        let fit = Regression::fit(&stats, MIN_EXPECTED_COUNT).unwrap();
        assert_relative_eq!(0.5, fit.slope);
        assert_eq!(MatchmakingVerdict::HalvedExpectation, fit.verdict());
    }

    #[test]
    fn test_fit_between_plateaus() {
        // Two plateaus: the line is a compromise through both.
        let stats = vec![stat(1.0, 4), stat(2.0, 4), stat(3.0, 8), stat(4.0, 8)];
        let fit = Regression::fit(&stats, MIN_EXPECTED_COUNT).unwrap();
        assert_relative_eq!(1.6, fit.slope, epsilon = 1e-12);
        assert_relative_eq!(2.0, fit.intercept, epsilon = 1e-12);
        assert_relative_eq!(0.8, fit.r_squared, epsilon = 1e-12);
        assert_eq!(MatchmakingVerdict::Biased, fit.verdict());
    }

    #[test]
    fn test_low_expectations_are_ignored() {
        let stats = vec![stat(0.01, 100), stat(0.005, 50), stat(1.0, 1), stat(2.0, 2)];
        let fit = Regression::fit(&stats, MIN_EXPECTED_COUNT).unwrap();
        assert_eq!(2, fit.samples);
        assert_relative_eq!(1.0, fit.slope);
    }

    #[test]
    fn test_threshold_applies_to_two_decimals() {
        // 0.012 is written as 0.01 and stays out; 0.016 is written as 0.02.
        let stats = vec![stat(0.012, 40), stat(0.016, 0), stat(1.02, 1)];
        let fit = Regression::fit(&stats, MIN_EXPECTED_COUNT).unwrap();
        assert_eq!(2, fit.samples);
        assert_relative_eq!(1.0, fit.slope, epsilon = 1e-12);
    }

    #[test]
    fn test_not_enough_data() {
        assert!(Regression::fit(&[], MIN_EXPECTED_COUNT).is_none());
        assert!(Regression::fit(&[stat(3.0, 3)], MIN_EXPECTED_COUNT).is_none());
        assert!(Regression::fit(&[stat(3.0, 3), stat(3.0, 5)], MIN_EXPECTED_COUNT).is_none());
    }

    #[test]
    fn test_verdict_bounds() {
        assert_eq!(MatchmakingVerdict::Random, MatchmakingVerdict::from_slope(0.9));
        assert_eq!(MatchmakingVerdict::Random, MatchmakingVerdict::from_slope(1.1));
        assert_eq!(
            MatchmakingVerdict::HalvedExpectation,
            MatchmakingVerdict::from_slope(0.45)
        );
        assert_eq!(MatchmakingVerdict::Biased, MatchmakingVerdict::from_slope(0.7));
        assert_eq!(MatchmakingVerdict::Biased, MatchmakingVerdict::from_slope(1.5));
    }
}
