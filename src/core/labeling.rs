//! Maps a cluster centroid to a stable, human-readable persona label.
//!
//! Raw cluster indices are arbitrary between runs; the label carries the
//! semantic meaning, derived purely from where the centroid sits in
//! income/score space.

const LOW_INCOME_BELOW: f64 = 45.0;
const HIGH_INCOME_ABOVE: f64 = 75.0;
const SCORE_SPLIT: f64 = 45.0;

/// Decision table over a centroid's (mean income, mean spending score).
///
/// Incomes in the closed band [45, 75] are always "Balanced Mainstream",
/// whatever the score.
pub fn label_for_centroid(avg_income: f64, avg_score: f64) -> &'static str {
    if avg_income < LOW_INCOME_BELOW {
        if avg_score < SCORE_SPLIT {
            "Sensible Savers"
        } else {
            "Impulsive Spenders"
        }
    } else if avg_income > HIGH_INCOME_ABOVE {
        if avg_score < SCORE_SPLIT {
            "Frugal Elites"
        } else {
            "Luxury Targets"
        }
    } else {
        "Balanced Mainstream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_corners() {
        assert_eq!(label_for_centroid(20.0, 20.0), "Sensible Savers");
        assert_eq!(label_for_centroid(20.0, 80.0), "Impulsive Spenders");
        assert_eq!(label_for_centroid(100.0, 20.0), "Frugal Elites");
        assert_eq!(label_for_centroid(100.0, 80.0), "Luxury Targets");
        assert_eq!(label_for_centroid(60.0, 50.0), "Balanced Mainstream");
    }

    #[test]
    fn test_income_band_boundaries() {
        // 45 is not < 45, and 75 is not > 75: both edges stay mainstream.
        assert_eq!(label_for_centroid(45.0, 45.0), "Balanced Mainstream");
        assert_eq!(label_for_centroid(45.0, 10.0), "Balanced Mainstream");
        assert_eq!(label_for_centroid(75.0, 99.0), "Balanced Mainstream");
        assert_eq!(label_for_centroid(75.0001, 44.0), "Frugal Elites");
        assert_eq!(label_for_centroid(44.9999, 44.9999), "Sensible Savers");
    }

    #[test]
    fn test_score_split_boundary() {
        // Score 45 counts as the high-spend side.
        assert_eq!(label_for_centroid(20.0, 45.0), "Impulsive Spenders");
        assert_eq!(label_for_centroid(90.0, 45.0), "Luxury Targets");
    }

    #[test]
    fn test_mid_income_ignores_score() {
        for score in [0.0, 25.0, 45.0, 70.0, 99.0] {
            assert_eq!(label_for_centroid(60.0, score), "Balanced Mainstream");
        }
    }
}
